//! Command trait definition.

use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};

use super::types::ExecutionContext;

/// Core trait for all dispatchable commands.
///
/// A command is bound to one (domain, command name) pair. Commands are
/// stateless: they hold only immutable handles to shared collaborators, and
/// everything request-scoped flows through `execute`.
///
/// # Example
///
/// ```ignore
/// pub struct HelloCommand;
///
/// impl Command for HelloCommand {
///     fn name(&self) -> &'static str {
///         "hello"
///     }
///
///     fn execute(
///         &self,
///         ctx: &mut ExecutionContext,
///         _response: &mut HttpResponse,
///     ) -> Result<Outcome, DispatchError> {
///         ctx.set_attribute("greeting", "hello")?;
///         Ok(Outcome::forward("common/hello"))
///     }
/// }
/// ```
pub trait Command: Send + Sync {
    /// Name the command is resolved by within its factory (e.g. "list.do").
    fn name(&self) -> &'static str;

    /// Execute the command.
    ///
    /// Returns the outcome the controller commits. A command that writes
    /// the response itself returns [`Outcome::Handled`]. Errors propagate to
    /// the controller, which answers 500.
    ///
    /// Note: This is called from a blocking context via `spawn_blocking`.
    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError>;

    /// Whether successful executions are audited.
    ///
    /// Failures are always audited. Only disable for high-frequency reads
    /// that would generate too much log volume.
    fn requires_audit(&self) -> bool {
        true
    }
}

use crate::SessionContext;
use quill_core::{Session, SESSION_MARGIN_SECS};

/// True while the token has more than the safety margin left at `now`.
pub fn is_token_fresh(session: &Session, now: i64) -> bool {
    session.expires_at.saturating_sub(SESSION_MARGIN_SECS) > now
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision<'a> {
    Proceed(&'a Session),
    Reauthenticate,
}

/// A context without a session is treated the same as a stale one.
pub fn check_gate(ctx: &SessionContext, now: i64) -> GateDecision<'_> {
    match ctx.session() {
        Some(session) if is_token_fresh(session, now) => GateDecision::Proceed(session),
        _ => GateDecision::Reauthenticate,
    }
}

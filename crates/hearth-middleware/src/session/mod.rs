//! Cookie-backed sessions.
//!
//! The [`SessionManager`] gives every request a session id, reusing a valid
//! inbound cookie or issuing a new one. Claims data lives with the
//! application: `get_claim` and `set_claim` forward to the handlers
//! registered for [`SessionEvent::ClaimsGet`] and [`SessionEvent::ClaimsSet`].
//!
//! | Event | Handler receives | Fired when |
//! |-------|------------------|------------|
//! | `created` | session id | a new id is issued |
//! | `claims:get` | session id, key | a handler reads a claim |
//! | `claims:set` | session id, key, value | a handler writes a claim |

mod cookie;
mod error;
mod handlers;
mod manager;
mod middleware;

pub use cookie::CookieSigner;
pub use error::SessionError;
pub use handlers::{SessionEvent, SessionHandler};
pub use manager::{SessionManager, SESSION_ID_LEN};
pub use middleware::SessionMiddleware;

//! Authentication side of the flow: the principal handed over by the
//! identity provider and the process-wide auth state observers watch.

pub mod principal;
pub mod state;

pub use principal::Principal;
pub use state::{AuthObserver, AuthSnapshot, AuthState};

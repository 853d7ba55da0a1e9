//! Onboarding — reconciling a signed-in user's profile with the store.
//!
//! After the identity provider signs a user in, the [`Reconciler`] registers
//! or fetches their profile, derives whether a username and phone number are
//! on file, persists those flags and announces the loaded user. The
//! [`OnboardingManager`] then collects whichever of the two is still missing.

pub mod locks;
pub mod manager;
pub mod model;
pub mod reconcile;
pub mod routes;
pub mod state;
pub mod validate;

pub use locks::{PrincipalGuard, PrincipalLocks};
pub use manager::{NextStep, OnboardingManager, OnboardingStatus};
pub use model::UserProfile;
pub use reconcile::Reconciler;
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use state::{OnboardingCategory, OnboardingFlags, classify};

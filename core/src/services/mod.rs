//! Business services containing domain logic and use cases.

pub mod auth;
pub mod clock;
pub mod maintenance;
pub mod token;
pub mod verification;

mod timeout;

// Re-export commonly used types
pub use auth::AuthService;
pub use clock::{Clock, ManualClock, SystemClock};
pub use maintenance::MaintenanceService;
pub use token::{RefreshTokenService, TokenSigner, TokenSignerConfig};
pub use verification::{
    generate_verification_code, EmailServiceTrait, InMemoryLockoutGuard, LockoutGuard,
    LockoutPolicy, LockoutState, LockoutSweep, VerificationService, VerificationServiceConfig,
};

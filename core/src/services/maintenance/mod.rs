//! Background maintenance of verification codes, lockouts and refresh tokens

mod service;

#[cfg(test)]
mod tests;

pub use service::MaintenanceService;

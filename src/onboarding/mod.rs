pub mod onboarding_service;

pub use onboarding_service::OnboardingService;

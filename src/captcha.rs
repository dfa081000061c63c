//! Captcha verification collaborator.

/// Verifies the captcha response attached to a public request.
pub trait CaptchaVerifier: Send + Sync {
    fn verify(&self, response: Option<&str>) -> bool;
}

/// Accepts everything. For deployments without a captcha provider.
pub struct NoCaptcha;

impl CaptchaVerifier for NoCaptcha {
    fn verify(&self, _response: Option<&str>) -> bool {
        true
    }
}

/// Compares against a fixed expected code.
pub struct StaticCaptcha {
    expected: String,
}

impl StaticCaptcha {
    pub fn new(expected: impl Into<String>) -> Self {
        StaticCaptcha {
            expected: expected.into(),
        }
    }
}

impl CaptchaVerifier for StaticCaptcha {
    fn verify(&self, response: Option<&str>) -> bool {
        response == Some(self.expected.as_str())
    }
}

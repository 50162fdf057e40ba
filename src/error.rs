/// Process-level error: a user-facing message plus the exit code the
/// `fitplan` binary should return.
///
/// Exit codes: 2 = invalid configuration/arguments, 3 = probe failure or
/// unsatisfiable planning (see `plan::PlanError`).
#[derive(Clone, Debug)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

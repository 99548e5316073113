use std::fmt;

/// User-friendly error wrapper
#[derive(Debug)]
pub struct UserError {
    message: String,
    details: Option<String>,
    suggestion: Option<String>,
}

impl UserError {
    /// Create a new user error
    pub fn new(message: impl Into<String>) -> Self {
        UserError {
            message: message.into(),
            details: None,
            suggestion: None,
        }
    }

    /// Add details about the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Add a suggestion for how to fix the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// Print the error to stderr
    pub fn display(&self) {
        eprintln!("\n❌ Error: {}", self.message);

        if let Some(ref details) = self.details {
            eprintln!("\n   {}", details);
        }

        if let Some(ref suggestion) = self.suggestion {
            eprintln!("\n💡 {}", suggestion);
        }
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref details) = self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for UserError {}

/// Convert common errors to user-friendly messages
pub fn user_friendly_error(error: &anyhow::Error) -> UserError {
    let error_str = format!("{:#}", error);

    if error_str.contains("GitHub token is empty") || error_str.contains("GITHUB_TOKEN") {
        return UserError::new("GitHub token not configured")
            .with_details("Requests to the GitHub API need a personal access token")
            .with_suggestion("Set the GITHUB_TOKEN environment variable or pass --token");
    }

    if error_str.contains("401") || error_str.contains("Bad credentials") {
        return UserError::new("Invalid GitHub token")
            .with_details("The provided token was rejected by the GitHub API")
            .with_suggestion("Check that GITHUB_TOKEN is valid and has not expired");
    }

    if error_str.contains("rate limit") {
        return UserError::new("API rate limit exceeded")
            .with_details("Too many requests have been made recently")
            .with_suggestion("Wait for the rate limit to reset or raise request_delay_ms");
    }

    if error_str.contains("Failed to read seed file") {
        return UserError::new("Seed file not found")
            .with_details(error_str)
            .with_suggestion("Pass a TOML file with a `dependencies` list via --seed");
    }

    if error_str.contains("Failed to parse seed file") {
        return UserError::new("Invalid seed file")
            .with_details(error_str)
            .with_suggestion("Expected `dependencies = [\"owner/repo\", ...]`");
    }

    if error_str.contains("Failed to read config") {
        return UserError::new("Configuration file not found")
            .with_details(error_str)
            .with_suggestion("Check the --config path or remove it to use defaults");
    }

    if error_str.contains("Failed to parse config") {
        return UserError::new("Invalid configuration file")
            .with_details("The configuration file contains syntax errors")
            .with_suggestion("Check the TOML syntax in your config.toml file");
    }

    if error_str.contains("Permission denied") {
        return UserError::new("Permission denied")
            .with_details("Cannot write to the specified location")
            .with_suggestion("Check that you have write permissions to the output directory");
    }

    if error_str.contains("network") || error_str.contains("connection") {
        return UserError::new("Network connection failed")
            .with_details("Could not connect to the GitHub API")
            .with_suggestion("Check your internet connection and try again");
    }

    UserError::new("An unexpected error occurred").with_details(error_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn test_token_errors() {
        let error = anyhow!("GitHub token is empty").context("Failed to create GitHub client");
        assert_eq!(user_friendly_error(&error).message(), "GitHub token not configured");

        let error = anyhow!("GitHub API error (401 Unauthorized): Bad credentials");
        assert_eq!(user_friendly_error(&error).message(), "Invalid GitHub token");
    }

    #[test]
    fn test_seed_errors_keep_details() {
        let result: anyhow::Result<()> =
            Err(anyhow!("No such file")).context("Failed to read seed file \"deps.toml\"");
        let user_error = user_friendly_error(&result.unwrap_err());

        assert_eq!(user_error.message(), "Seed file not found");
        assert!(user_error.to_string().contains("deps.toml"));
        assert!(user_error.suggestion().unwrap().contains("--seed"));
    }

    #[test]
    fn test_fallback() {
        let error = anyhow!("something odd");
        let user_error = user_friendly_error(&error);
        assert_eq!(user_error.message(), "An unexpected error occurred");
        assert_eq!(user_error.to_string(), "An unexpected error occurred: something odd");
    }
}

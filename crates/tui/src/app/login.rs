#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    Register,
}

impl AuthMode {
    pub fn title(self) -> &'static str {
        match self {
            Self::SignIn => "Welcome Back!",
            Self::Register => "Create a New Account",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::Register => "Create Account",
        }
    }

    pub fn toggle_hint(self) -> &'static str {
        match self {
            Self::SignIn => "Don't have an account? Sign Up",
            Self::Register => "Already have an account? Sign In",
        }
    }
}

#[derive(Debug, Default)]
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub mode: AuthMode,
    pub message: Option<String>,
    pub pending: bool,
}

impl LoginState {
    /// Switches between sign-in and registration, clearing the form.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::Register,
            AuthMode::Register => AuthMode::SignIn,
        };
        self.email.clear();
        self.password.clear();
        self.message = None;
        self.focus = LoginField::Email;
    }

    pub fn advance_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn active_field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    /// Credentials to submit, or `None` if a request is already out.
    pub fn begin_submit(&mut self) -> Option<(String, String)> {
        if self.pending {
            return None;
        }
        self.pending = true;
        self.message = None;
        Some((self.email.trim().to_string(), self.password.clone()))
    }

    pub fn finish_submit(&mut self, outcome: Result<(), String>) {
        self.pending = false;
        match outcome {
            Ok(()) => {
                self.email.clear();
                self.password.clear();
                self.focus = LoginField::Email;
            }
            Err(message) => self.message = Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_clears_form_and_error() {
        let mut login = LoginState {
            email: "a@b.c".to_string(),
            password: "secret".to_string(),
            message: Some("Invalid email or password.".to_string()),
            ..LoginState::default()
        };
        login.toggle_mode();
        assert_eq!(login.mode, AuthMode::Register);
        assert!(login.email.is_empty());
        assert!(login.password.is_empty());
        assert_eq!(login.message, None);
    }

    #[test]
    fn one_submit_at_a_time() {
        let mut login = LoginState {
            email: " a@b.c ".to_string(),
            password: " pw ".to_string(),
            ..LoginState::default()
        };
        assert_eq!(
            login.begin_submit(),
            Some(("a@b.c".to_string(), " pw ".to_string()))
        );
        assert_eq!(login.begin_submit(), None);

        login.finish_submit(Err("Invalid email or password.".to_string()));
        assert!(!login.pending);
        assert_eq!(login.message.as_deref(), Some("Invalid email or password."));
        assert_eq!(login.email, " a@b.c ");
    }
}

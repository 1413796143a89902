use shared::{
    domain::{Credentials, RegistrationRequest, MIN_PASSWORD_LEN},
    error::AuthFailure,
};

/// Gates run in strict order; only the first failing gate is reported, so a
/// short-but-present password trips the length check and nothing else.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), AuthFailure> {
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Err(AuthFailure::MissingFields);
    }
    if credentials.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthFailure::WeakPassword);
    }
    Ok(())
}

/// Same ordering discipline as [`validate_credentials`], with the mismatch
/// gate last. All five fields must be present before any remote call.
pub fn validate_registration(request: &RegistrationRequest) -> Result<(), AuthFailure> {
    if request.email.is_empty()
        || request.password.is_empty()
        || request.confirm_password.is_empty()
        || request.full_name.is_empty()
        || request.profile_picture.is_none()
    {
        return Err(AuthFailure::MissingFields);
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthFailure::WeakPassword);
    }
    if request.password != request.confirm_password {
        return Err(AuthFailure::PasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::ProfilePicture;

    fn picture() -> ProfilePicture {
        ProfilePicture {
            filename: "me.png".into(),
            content_type: Some("image/png".into()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    fn registration() -> RegistrationRequest {
        RegistrationRequest {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password: "correct horse".into(),
            confirm_password: "correct horse".into(),
            profile_picture: Some(picture()),
        }
    }

    #[test]
    fn empty_credentials_hit_the_missing_fields_gate_first() {
        let creds = Credentials {
            email: String::new(),
            password: "short".into(),
        };
        assert_eq!(
            validate_credentials(&creds),
            Err(AuthFailure::MissingFields)
        );
    }

    #[test]
    fn short_password_trips_only_the_length_gate() {
        let creds = Credentials {
            email: "ada@example.com".into(),
            password: "seven77".into(),
        };
        assert_eq!(validate_credentials(&creds), Err(AuthFailure::WeakPassword));
    }

    #[test]
    fn eight_chars_is_long_enough() {
        let creds = Credentials {
            email: "ada@example.com".into(),
            password: "eight888".into(),
        };
        assert_eq!(validate_credentials(&creds), Ok(()));
    }

    #[test]
    fn absent_picture_counts_as_a_missing_field() {
        let mut request = registration();
        request.profile_picture = None;
        assert_eq!(
            validate_registration(&request),
            Err(AuthFailure::MissingFields)
        );
    }

    #[test]
    fn weak_password_wins_over_mismatch() {
        let mut request = registration();
        request.password = "short".into();
        request.confirm_password = "different".into();
        assert_eq!(
            validate_registration(&request),
            Err(AuthFailure::WeakPassword)
        );
    }

    #[test]
    fn mismatch_is_reported_once_both_passwords_are_long_enough() {
        let mut request = registration();
        request.confirm_password = "correct zebra".into();
        assert_eq!(
            validate_registration(&request),
            Err(AuthFailure::PasswordMismatch)
        );
    }

    #[test]
    fn complete_registration_passes_every_gate() {
        assert_eq!(validate_registration(&registration()), Ok(()));
    }
}

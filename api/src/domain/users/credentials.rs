//! Registration rules for logins and passwords.
//!
//! Login: at least 8 characters, ASCII letters and digits only, at least one
//! digit. Password: at least 8 characters with an upper-case letter, a
//! lower-case letter, a digit and at least one other character.

const MIN_LEN: usize = 8;

pub fn login_is_valid(login: &str) -> bool {
    login.chars().count() >= MIN_LEN
        && login.chars().all(|c| c.is_ascii_alphanumeric())
        && login.chars().any(|c| c.is_ascii_digit())
}

pub fn password_is_valid(password: &str) -> bool {
    if password.chars().count() < MIN_LEN {
        return false;
    }
    let (mut upper, mut lower, mut digit, mut special) = (false, false, false, false);
    for c in password.chars() {
        if c.is_uppercase() {
            upper = true;
        } else if c.is_lowercase() {
            lower = true;
        } else if c.is_numeric() {
            digit = true;
        } else {
            special = true;
        }
    }
    upper && lower && digit && special
}

pub fn credentials_are_valid(login: &str, password: &str) -> bool {
    login_is_valid(login) && password_is_valid(password)
}

use crate::config::AuthApiSecret;
use subtle::ConstantTimeEq;

fn api_secret_matches(token: &str, secret: &str) -> bool {
    bool::from(token.as_bytes().ct_eq(secret.as_bytes()))
}

/// Identifier of the first configured secret equal to `token`.
pub fn match_api_secret_id<'a>(token: &str, secrets: &'a [AuthApiSecret]) -> Option<&'a str> {
    secrets
        .iter()
        .find(|entry| api_secret_matches(token, &entry.secret))
        .map(|entry| entry.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets() -> Vec<AuthApiSecret> {
        vec![
            AuthApiSecret {
                id: "dashboard".to_string(),
                secret: "alpha".to_string(),
            },
            AuthApiSecret {
                id: "batch".to_string(),
                secret: "beta".to_string(),
            },
        ]
    }

    #[test]
    fn test_match_api_secret_id() {
        let secrets = secrets();
        assert_eq!(match_api_secret_id("alpha", &secrets), Some("dashboard"));
        assert_eq!(match_api_secret_id("beta", &secrets), Some("batch"));
        assert_eq!(match_api_secret_id("alph", &secrets), None);
        assert_eq!(match_api_secret_id("", &secrets), None);
        assert_eq!(match_api_secret_id("alpha", &[]), None);
    }
}

//! Keyword-based domain detection.
//!
//! Counts, per domain, how many of its keywords appear as substrings of the lowercased
//! query. Highest count wins; ties go to the earlier domain in [`Domain::ALL`]; no hits at
//! all falls back to [`Domain::SecurityRules`].

use crate::catalog::Domain;

fn keywords(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::AuthMethods => &[
            "jwt",
            "session",
            "oauth",
            "saml",
            "api key",
            "bearer",
            "basic auth",
            "mtls",
            "passwordless",
            "webauthn",
            "magic link",
            "cognito",
            "auth0",
            "okta",
            "keycloak",
        ],
        Domain::Oauth2Flows => &[
            "oauth2",
            "authorization code",
            "pkce",
            "implicit",
            "client credentials",
            "device",
            "refresh token",
            "grant type",
            "flow",
        ],
        Domain::JwtClaims => &[
            "jwt",
            "token",
            "claims",
            "iss",
            "sub",
            "aud",
            "exp",
            "iat",
            "scope",
            "roles",
            "permissions",
        ],
        Domain::SecurityHeaders => &[
            "headers",
            "csp",
            "hsts",
            "x-frame",
            "security header",
            "http header",
            "cors",
        ],
        Domain::OidcProviders => &[
            "provider",
            "auth0",
            "okta",
            "cognito",
            "azure ad",
            "firebase",
            "keycloak",
            "identity",
            "sso",
            "idp",
        ],
        Domain::SecurityRules => &[
            "security",
            "token storage",
            "password",
            "rate limit",
            "csrf",
            "session",
            "mfa",
            "2fa",
            "validation",
            "https",
            "tls",
        ],
    }
}

fn count_hits(lowered: &str, domain: Domain) -> usize {
    keywords(domain)
        .iter()
        .filter(|kw| lowered.contains(*kw))
        .count()
}

/// Number of `domain` keywords contained in `query` (case-insensitive).
pub fn keyword_hits(query: &str, domain: Domain) -> usize {
    count_hits(&query.to_lowercase(), domain)
}

/// Pick the most likely domain for `query`.
pub fn classify(query: &str) -> Domain {
    let query = query.to_lowercase();
    let mut best = Domain::SecurityRules;
    let mut best_hits = 0;
    for domain in Domain::ALL {
        let hits = count_hits(&query, domain);
        // Strictly greater: earlier domains win ties.
        if hits > best_hits {
            best = domain;
            best_hits = hits;
        }
    }
    tracing::debug!(%best, hits = best_hits, "classified query");
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keywords_falls_back_to_security_rules() {
        assert_eq!(classify("hello world"), Domain::SecurityRules);
        assert_eq!(classify(""), Domain::SecurityRules);
    }

    #[test]
    fn picks_domain_with_most_hits() {
        assert_eq!(classify("PKCE authorization code flow"), Domain::Oauth2Flows);
        assert_eq!(classify("CSP and HSTS headers"), Domain::SecurityHeaders);
        assert_eq!(classify("csrf protection"), Domain::SecurityRules);
    }

    #[test]
    fn ties_go_to_earlier_domain() {
        // "jwt" hits auth-methods and jwt-claims once each.
        assert_eq!(keyword_hits("jwt", Domain::AuthMethods), 1);
        assert_eq!(keyword_hits("jwt", Domain::JwtClaims), 1);
        assert_eq!(classify("jwt"), Domain::AuthMethods);
        // "okta" ties auth-methods and oidc-providers.
        assert_eq!(classify("Okta"), Domain::AuthMethods);
    }

    #[test]
    fn matching_is_substring_based() {
        // "exp" inside "expiry", "token" as well.
        assert_eq!(keyword_hits("token expiry", Domain::JwtClaims), 2);
        assert_eq!(classify("token expiry"), Domain::JwtClaims);
    }
}

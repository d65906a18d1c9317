use serde::Serialize;

/// Postgres connection target with the password and secret parameters masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactedConnection {
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub redacted: String,
}

const MASK: &str = "***";

/// Mask secrets in a `postgres://` URL so it can be logged.
///
/// Strings without a scheme are returned fully masked, since key/value DSNs
/// may carry a password anywhere.
pub fn redact_connection_string(conn: &str) -> RedactedConnection {
    let Some((scheme, rest)) = conn.split_once("://") else {
        return RedactedConnection {
            user: None,
            host: None,
            port: None,
            database: None,
            redacted: MASK.to_string(),
        };
    };

    // Userinfo first: a password may contain `?` or `/`. Without a `:` there is
    // no password, so an `@` past a `/` or `?` belongs to the path or query.
    let (userinfo, rest) = match rest.rsplit_once('@') {
        Some((userinfo, _)) if !userinfo.contains(':') && userinfo.contains(['/', '?']) => {
            (None, rest)
        }
        Some((userinfo, rest)) => (Some(userinfo), rest),
        None => (None, rest),
    };

    let (location, query) = match rest.split_once('?') {
        Some((head, query)) => (head, Some(query)),
        None => (rest, None),
    };

    let (user, masked_userinfo) = match userinfo {
        Some(info) => match info.split_once(':') {
            Some((user, _)) => (Some(user.to_string()), Some(format!("{user}:{MASK}"))),
            None => (Some(info.to_string()), Some(info.to_string())),
        },
        None => (None, None),
    };

    let (authority, database) = match location.split_once('/') {
        Some((authority, db)) if !db.is_empty() => (authority, Some(db.to_string())),
        Some((authority, _)) => (authority, None),
        None => (location, None),
    };

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().ok()),
        None => (authority, None),
    };
    let host = (!host.is_empty()).then(|| host.to_string());

    let mut redacted = format!("{scheme}://");
    if let Some(info) = masked_userinfo {
        redacted.push_str(&info);
        redacted.push('@');
    }
    redacted.push_str(location);
    if let Some(query) = query {
        redacted.push('?');
        redacted.push_str(&mask_query(query));
    }

    RedactedConnection {
        user,
        host,
        port,
        database,
        redacted,
    }
}

fn mask_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_secret_param(key) => format!("{key}={MASK}"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_secret_param(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "password" | "passfile" | "sslpassword" | "sslkey"
    )
}

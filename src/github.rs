use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::window::DateWindow;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PER_PAGE: &str = "100";

/// An organization as returned by `GET /orgs/{org}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Organization {
    /// Human-facing name, falling back to the login when none is set.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.login,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

#[derive(Debug, Deserialize)]
struct CommitItem {
    commit: CommitDetails,
}

#[derive(Debug, Deserialize)]
struct CommitDetails {
    message: String,
    #[serde(default)]
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

/// The source-hosting operations the commit collector needs.
pub trait SourceHost {
    /// Login of the identity the session is authenticated as.
    fn authenticated_login(&self) -> Result<String>;

    fn organization(&self, name: &str) -> Result<Organization>;

    fn repositories(&self, org: &Organization) -> Result<Vec<Repository>>;

    /// Messages of commits by `author` inside `window`, in listing order.
    fn commit_messages(
        &self,
        org: &Organization,
        repo: &Repository,
        author: &str,
        window: &DateWindow,
    ) -> Result<Vec<String>>;
}

/// Blocking GitHub REST v3 client.
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .context("GitHub token contains characters not allowed in a header")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));

        let http = Client::builder()
            .user_agent(concat!("monthly-report/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build `{api_url}/{segments...}?{params}`, percent-encoding each segment
    /// so names from config can't escape their place in the path.
    fn endpoint(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&self.api_url)
            .with_context(|| format!("invalid GitHub URL {}", self.api_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow!("GitHub URL {} cannot take a path", self.api_url))?
            .pop_if_empty()
            .extend(segments);

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        log::debug!("GET {url}");

        self.http
            .get(url.clone())
            .send()
            .with_context(|| format!("failed to send request to {url}"))?
            .error_for_status()
            .with_context(|| format!("GitHub API error from {url}"))?
            .json()
            .with_context(|| format!("failed to parse GitHub response from {url}"))
    }

    /// Fetch every page of a list endpoint by following `rel="next"` links.
    fn get_paginated<T: DeserializeOwned>(&self, first: Url) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first.to_string());

        while let Some(url) = next {
            log::debug!("GET {url}");

            let resp = self
                .http
                .get(&url)
                .send()
                .with_context(|| format!("failed to send request to {url}"))?
                .error_for_status()
                .with_context(|| format!("GitHub API error from {url}"))?;

            next = resp
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);

            let page: Vec<T> = resp
                .json()
                .with_context(|| format!("failed to parse GitHub response from {url}"))?;

            log::trace!("{} item(s) on page {url}", page.len());
            items.extend(page);
        }

        Ok(items)
    }
}

impl SourceHost for GitHubClient {
    fn authenticated_login(&self) -> Result<String> {
        let user: User = self.get_json(self.endpoint(&["user"], &[])?)?;
        Ok(user.login)
    }

    fn organization(&self, name: &str) -> Result<Organization> {
        self.get_json(self.endpoint(&["orgs", name], &[])?)
    }

    fn repositories(&self, org: &Organization) -> Result<Vec<Repository>> {
        let url = self.endpoint(&["orgs", org.login.as_str(), "repos"], &[("per_page", PER_PAGE)])?;
        self.get_paginated(url)
    }

    fn commit_messages(
        &self,
        org: &Organization,
        repo: &Repository,
        author: &str,
        window: &DateWindow,
    ) -> Result<Vec<String>> {
        let since = window.since().to_rfc3339();
        let until = window.until().to_rfc3339();
        let url = self.endpoint(
            &["repos", org.login.as_str(), repo.name.as_str(), "commits"],
            &[
                ("author", author),
                ("since", &since),
                ("until", &until),
                ("per_page", PER_PAGE),
            ],
        )?;

        let commits: Vec<CommitItem> = self.get_paginated(url)?;

        Ok(commits
            .into_iter()
            .filter(|c| within_window(c, window))
            .map(|c| c.commit.message)
            .collect())
    }
}

/// GitHub's `until` filter is inclusive; keep only commits stamped inside
/// the half-open window. Undated commits are trusted to the server filter.
fn within_window(item: &CommitItem, window: &DateWindow) -> bool {
    item.commit
        .committer
        .as_ref()
        .and_then(|s| s.date)
        .is_none_or(|date| window.contains(date))
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| {
            let p = p.trim();
            p == "rel=\"next\"" || p == "rel=next"
        });

        if !is_next {
            return None;
        }

        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc::{self, Receiver};
    use std::thread;

    fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Answer `requests` sequential GET requests. `route` gets the server's
    /// base URL and the request target and returns the raw response. Each
    /// request head is handed back, lowercased.
    fn serve<F>(requests: usize, route: F) -> (String, Receiver<String>)
    where
        F: Fn(&str, &str) -> String + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server_base = base.clone();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for _ in 0..requests {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];

                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut chunk).unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                let head = String::from_utf8_lossy(&buf).to_string();
                let target = head.split_whitespace().nth(1).unwrap_or("").to_string();
                let _ = tx.send(head.to_lowercase());
                stream
                    .write_all(route(&server_base, &target).as_bytes())
                    .unwrap();
            }
        });

        (base, rx)
    }

    fn client(base: &str) -> GitHubClient {
        GitHubClient::new(base, "t0ken", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn commits_follow_next_links_and_keep_the_window_half_open() {
        let (base, rx) = serve(2, |base, target| {
            if target.contains("page=2") {
                http_response(
                    "200 OK",
                    "",
                    r#"[{"sha":"c","commit":{"message":"inside two","committer":{"date":"2025-07-31T23:59:59Z"}}}]"#,
                )
            } else {
                let link = format!(
                    "Link: <{base}/repos/acme/api/commits?page=2>; rel=\"next\", <{base}/repos/acme/api/commits?page=2>; rel=\"last\"\r\n"
                );
                http_response(
                    "200 OK",
                    &link,
                    r#"[
                        {"sha":"a","commit":{"message":"inside one","committer":{"date":"2025-07-10T09:00:00Z"}}},
                        {"sha":"b","commit":{"message":"on the boundary","committer":{"date":"2025-08-01T00:00:00Z"}}}
                    ]"#,
                )
            }
        });

        let org = Organization {
            login: "acme".to_string(),
            name: Some("Acme".to_string()),
        };
        let repo = Repository {
            name: "api".to_string(),
        };
        let window = DateWindow::month("2025-07").unwrap();

        let messages = client(&base)
            .commit_messages(&org, &repo, "octocat", &window)
            .unwrap();
        assert_eq!(messages, vec!["inside one", "inside two"]);

        let first = rx.recv().unwrap();
        let second = rx.recv().unwrap();
        assert!(first.starts_with("get /repos/acme/api/commits?author=octocat&since=2025-07-01"));
        assert!(second.starts_with("get /repos/acme/api/commits?page=2 "));
        for head in [&first, &second] {
            assert!(head.contains("authorization: bearer t0ken"), "{head}");
            assert!(head.contains("x-github-api-version: 2022-11-28"), "{head}");
            assert!(head.contains("user-agent: monthly-report/"), "{head}");
            assert!(head.contains("accept: application/vnd.github+json"), "{head}");
        }
    }

    #[test]
    fn repositories_are_collected_across_pages() {
        let (base, _rx) = serve(2, |base, target| {
            if target.contains("page=2") {
                http_response("200 OK", "", r#"[{"name":"web"}]"#)
            } else {
                let link = format!("Link: <{base}/orgs/acme/repos?per_page=100&page=2>; rel=\"next\"\r\n");
                http_response("200 OK", &link, r#"[{"name":"api"},{"name":"docs"}]"#)
            }
        });
        let org = Organization {
            login: "acme".to_string(),
            name: None,
        };

        let names: Vec<String> = client(&base)
            .repositories(&org)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["api", "docs", "web"]);
    }

    #[test]
    fn missing_organization_is_an_error() {
        let (base, rx) = serve(1, |_, _| {
            http_response("404 Not Found", "", r#"{"message":"Not Found"}"#)
        });

        let err = client(&base).organization("ghost").unwrap_err();
        assert!(format!("{err:#}").contains("404"), "{err:#}");
        assert!(rx.recv().unwrap().starts_with("get /orgs/ghost "));
    }

    #[test]
    fn organization_names_stay_inside_their_path_segment() {
        let (base, rx) = serve(1, |_, _| {
            http_response("404 Not Found", "", r#"{"message":"Not Found"}"#)
        });

        assert!(client(&base).organization("team/x?y#z").is_err());
        assert!(rx.recv().unwrap().starts_with("get /orgs/team%2fx%3fy%23z "));
    }

    #[test]
    fn next_link_is_found_among_others() {
        let link = r#"<https://api.github.com/organizations/1/repos?per_page=100&page=1>; rel="prev", <https://api.github.com/organizations/1/repos?per_page=100&page=3>; rel="next", <https://api.github.com/organizations/1/repos?per_page=100&page=5>; rel="last""#;
        assert_eq!(
            next_page_url(link).as_deref(),
            Some("https://api.github.com/organizations/1/repos?per_page=100&page=3")
        );
    }

    #[test]
    fn last_page_has_no_next_link() {
        let link = r#"<https://api.github.com/repos/o/r/commits?page=1>; rel="first", <https://api.github.com/repos/o/r/commits?page=4>; rel="prev""#;
        assert_eq!(next_page_url(link), None);
        assert_eq!(next_page_url(""), None);
    }

    #[test]
    fn display_name_falls_back_to_login() {
        let named: Organization =
            serde_json::from_str(r#"{"login":"acme-inc","name":"Acme Inc","id":7}"#).unwrap();
        assert_eq!(named.display_name(), "Acme Inc");

        let unnamed: Organization = serde_json::from_str(r#"{"login":"acme-inc","name":null}"#).unwrap();
        assert_eq!(unnamed.display_name(), "acme-inc");

        let blank: Organization = serde_json::from_str(r#"{"login":"acme-inc","name":"  "}"#).unwrap();
        assert_eq!(blank.display_name(), "acme-inc");
    }

    #[test]
    fn commits_at_window_end_are_dropped() {
        let window = DateWindow::month("2025-07").unwrap();
        let page: Vec<CommitItem> = serde_json::from_str(
            r#"[
                {"sha":"a","commit":{"message":"inside","committer":{"name":"x","date":"2025-07-31T23:59:59Z"}}},
                {"sha":"b","commit":{"message":"boundary","committer":{"name":"x","date":"2025-08-01T00:00:00Z"}}},
                {"sha":"c","commit":{"message":"undated","committer":null}}
            ]"#,
        )
        .unwrap();

        let kept: Vec<&str> = page
            .iter()
            .filter(|c| within_window(c, &window))
            .map(|c| c.commit.message.as_str())
            .collect();
        assert_eq!(kept, vec!["inside", "undated"]);
    }

    #[test]
    fn endpoint_encodes_query_parameters() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/", "t0ken", Duration::from_secs(5)).unwrap();
        let url = client
            .endpoint(&["repos", "acme", "api", "commits"], &[("author", "jane doe"), ("per_page", "100")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/acme/api/commits?author=jane+doe&per_page=100"
        );
    }
}

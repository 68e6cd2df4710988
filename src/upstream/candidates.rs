use shared::{utils::{join_url, normalize_base}, BackendConfig};

/// One backend base URL, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendBase {
    pub url: String,
    /// The configured internal base. Exempt from self-call checks.
    pub trusted: bool,
}

/// A concrete URL to try, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: String,
    pub trusted: bool,
}

/// Ordered, deduplicated list of backend bases: internal, public, local fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCandidates {
    bases: Vec<BackendBase>,
}

impl BackendCandidates {
    pub fn from_config(config: &BackendConfig) -> Self {
        let mut bases: Vec<BackendBase> = Vec::with_capacity(3);

        let mut push = |raw: &str, trusted: bool| {
            let url = normalize_base(raw);
            if url.is_empty() || bases.iter().any(|b| b.url == url) {
                return;
            }
            bases.push(BackendBase { url, trusted });
        };

        if let Some(internal) = &config.internal_base {
            push(internal, true);
        }
        if let Some(public) = &config.public_base {
            push(public, false);
        }
        push(&config.local_fallback, false);

        Self { bases }
    }

    pub fn bases(&self) -> &[BackendBase] {
        &self.bases
    }

    pub fn urls(&self) -> Vec<String> {
        self.bases.iter().map(|b| b.url.clone()).collect()
    }

    /// Expands every base into its bare target and, when requested, the
    /// `/api`-prefixed variant right after it.
    pub fn targets(&self, resource: &str, try_api_prefix: bool) -> Vec<Target> {
        let resource = resource.trim_start_matches('/');
        let mut targets = Vec::with_capacity(self.bases.len() * 2);

        for base in &self.bases {
            targets.push(Target {
                url: join_url(&base.url, resource),
                trusted: base.trusted,
            });
            if try_api_prefix && !resource.starts_with("api/") {
                targets.push(Target {
                    url: join_url(&join_url(&base.url, "api"), resource),
                    trusted: base.trusted,
                });
            }
        }

        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(internal: Option<&str>, public: Option<&str>, fallback: &str) -> BackendConfig {
        BackendConfig {
            internal_base: internal.map(str::to_string),
            public_base: public.map(str::to_string),
            local_fallback: fallback.to_string(),
            timeout_seconds: 15,
        }
    }

    #[test]
    fn test_internal_public_fallback_order() {
        let candidates = BackendCandidates::from_config(&config(
            Some("http://backend:8000/"),
            Some("https://api.ima.cl"),
            "http://127.0.0.1:8008",
        ));

        assert_eq!(
            candidates.urls(),
            vec!["http://backend:8000", "https://api.ima.cl", "http://127.0.0.1:8008"]
        );
        assert!(candidates.bases()[0].trusted);
        assert!(!candidates.bases()[1].trusted);
    }

    #[test]
    fn test_duplicates_collapse_after_normalization() {
        let candidates = BackendCandidates::from_config(&config(
            Some("http://127.0.0.1:8008/"),
            Some("http://127.0.0.1:8008"),
            "http://127.0.0.1:8008//",
        ));
        assert_eq!(candidates.urls(), vec!["http://127.0.0.1:8008"]);
        assert!(candidates.bases()[0].trusted);

        let only_fallback = BackendCandidates::from_config(&config(None, Some("  "), "http://127.0.0.1:8008"));
        assert_eq!(only_fallback.urls(), vec!["http://127.0.0.1:8008"]);
    }

    #[test]
    fn test_targets_interleave_bare_and_api_prefix() {
        let candidates = BackendCandidates::from_config(&config(Some("http://a"), Some("http://b"), "http://c"));
        let urls: Vec<String> = candidates
            .targets("/boletas/facturadas", true)
            .into_iter()
            .map(|t| t.url)
            .collect();

        assert_eq!(
            urls,
            vec![
                "http://a/boletas/facturadas",
                "http://a/api/boletas/facturadas",
                "http://b/boletas/facturadas",
                "http://b/api/boletas/facturadas",
                "http://c/boletas/facturadas",
                "http://c/api/boletas/facturadas",
            ]
        );

        assert_eq!(candidates.targets("empresas", false).len(), 3);
    }
}

// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Name normalization for external identifiers.

use std::sync::Arc;

/// Rewrites a raw namespace, subsystem or metric name into an identifier
/// the external registry accepts. Must be deterministic and idempotent.
pub type NameNormalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Replaces every space, `.`, `-` and `=` with `_`.
pub fn default_normalizer(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            ' ' | '.' | '-' | '=' => '_',
            other => other,
        })
        .collect()
}

/// Same as [`default_normalizer`], then lower-cases the result.
pub fn lowercase_normalizer(raw: &str) -> String {
    default_normalizer(raw).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_replaces_separators() {
        assert_eq!(default_normalizer("http.requests-total"), "http_requests_total");
        assert_eq!(default_normalizer("cache hits=warm"), "cache_hits_warm");
        assert_eq!(default_normalizer("Already_Fine"), "Already_Fine");
        assert_eq!(default_normalizer(""), "");
    }

    #[test]
    fn test_lowercase_variant() {
        assert_eq!(lowercase_normalizer("Counter"), "counter");
        assert_eq!(lowercase_normalizer("DB.Pool-Size"), "db_pool_size");
    }

    #[test]
    fn test_normalizers_are_idempotent() {
        for raw in ["a.b c", "X-Y=Z", "plain", "Mixed.Case Name"] {
            let once = default_normalizer(raw);
            assert_eq!(default_normalizer(&once), once);

            let once = lowercase_normalizer(raw);
            assert_eq!(lowercase_normalizer(&once), once);
        }
    }
}

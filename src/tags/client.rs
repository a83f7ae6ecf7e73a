use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, StatusCode};
use tracing::{debug, info, warn};
use url::Url;
use crate::config::Config;
use crate::{Error, Result};
use super::{NewTag, TagRecord};

/// Backend that stores tags.
#[async_trait]
pub trait TagService: Send + Sync + std::fmt::Debug {
    async fn create_tag(&self, tag: &NewTag) -> Result<TagRecord>;
}

/// `TagService` speaking JSON over HTTP to `{endpoint}/tags`.
#[derive(Debug, Clone)]
pub struct HttpTagService {
    client: Client,
    base_url: Url,
}

impl HttpTagService {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.endpoint_url()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tags_url(&self) -> Result<Url> {
        Ok(self.base_url.join("tags")?)
    }

    fn retry_after(headers: &HeaderMap) -> Option<u64> {
        headers
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }
}

#[async_trait]
impl TagService for HttpTagService {
    async fn create_tag(&self, tag: &NewTag) -> Result<TagRecord> {
        let url = self.tags_url()?;
        debug!("POST {} slug={}", url, tag.slug);

        let response = self.client.post(url).json(tag).send().await?;
        let status = response.status();

        if status == StatusCode::CONFLICT {
            warn!("Tag slug '{}' already exists", tag.slug);
            return Err(Error::Conflict {
                slug: tag.slug.clone(),
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimit {
                retry_after: Self::retry_after(response.headers()),
            });
        }

        if !status.is_success() {
            return Err(Error::Api {
                code: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let record = if body.trim().is_empty() {
            TagRecord::from(tag.clone())
        } else {
            match serde_json::from_str::<TagRecord>(&body) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Unexpected create-tag response body: {}", e);
                    TagRecord::from(tag.clone())
                }
            }
        };

        info!(
            "Created tag '{}' ({})",
            record.slug,
            record.id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "no id".to_string())
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_tags_url_from_config() {
        let service = HttpTagService::new(&Config::from_endpoint("http://localhost:3333").unwrap()).unwrap();
        assert_eq!(service.tags_url().unwrap().as_str(), "http://localhost:3333/tags");

        let service = HttpTagService::new(&Config::from_endpoint("https://api.example.com/v1/").unwrap()).unwrap();
        assert_eq!(service.tags_url().unwrap().as_str(), "https://api.example.com/v1/tags");
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(HttpTagService::retry_after(&headers), None);

        headers.insert("retry-after", HeaderValue::from_static("12"));
        assert_eq!(HttpTagService::retry_after(&headers), Some(12));

        headers.insert("retry-after", HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"));
        assert_eq!(HttpTagService::retry_after(&headers), None);
    }
}

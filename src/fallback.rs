//! Static documents that seed the task list when nothing has been stored locally yet

use std::error::Error;
use std::path::PathBuf;

use async_trait::async_trait;
use url::Url;

use crate::traits::FallbackSource;

/// Where the bundled fallback document lives
#[derive(Clone, Debug, PartialEq)]
pub enum StaticResource {
    /// There is no fallback document: the task list starts empty
    Nothing,
    /// A file on disk
    File(PathBuf),
    /// A document served over HTTP(S)
    Http(Url),
}

impl StaticResource {
    /// Interpret a command-line location: `http://` and `https://` URLs are fetched from the network, anything else is a path
    pub fn from_location(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => StaticResource::Http(url),
            _ => StaticResource::File(PathBuf::from(location)),
        }
    }
}

impl Default for StaticResource {
    fn default() -> Self {
        StaticResource::Nothing
    }
}

#[async_trait]
impl FallbackSource for StaticResource {
    async fn fetch(&self) -> Result<String, Box<dyn Error>> {
        match self {
            StaticResource::Nothing => Err("No fallback document is configured".into()),
            StaticResource::File(path) => {
                match std::fs::read_to_string(path) {
                    Err(err) => Err(format!("Unable to open file {:?}: {}", path, err).into()),
                    Ok(content) => Ok(content),
                }
            },
            StaticResource::Http(url) => {
                log::debug!("Fetching fallback document from {}", url);
                let response = reqwest::get(url.clone()).await?;
                let status = response.status();
                if status.is_success() == false {
                    return Err(format!("Unexpected HTTP status {} for {}", status, url).into());
                }
                Ok(response.text().await?)
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations() {
        assert_eq!(StaticResource::from_location("public/todos.json"), StaticResource::File(PathBuf::from("public/todos.json")));
        assert_eq!(StaticResource::from_location("/srv/todos.json"), StaticResource::File(PathBuf::from("/srv/todos.json")));
        assert_eq!(StaticResource::from_location("https://example.com/todos.json"),
                   StaticResource::Http(Url::parse("https://example.com/todos.json").unwrap()));
        // Windows paths parse as URLs with a one-letter scheme
        assert_eq!(StaticResource::from_location("C:\\todos.json"), StaticResource::File(PathBuf::from("C:\\todos.json")));
    }

    #[tokio::test]
    async fn fetch_file() {
        let folder = tempfile::tempdir().unwrap();
        let path = folder.path().join("todos.json");
        std::fs::write(&path, "[]").unwrap();

        assert_eq!(StaticResource::File(path).fetch().await.unwrap(), "[]");
        assert!(StaticResource::File(folder.path().join("missing.json")).fetch().await.is_err());
        assert!(StaticResource::Nothing.fetch().await.is_err());
    }
}

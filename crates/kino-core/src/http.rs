//! Blocking HTTP GET and HEAD over libcurl.
//!
//! Every call runs on the current thread; a kino run has no other work to
//! overlap with a network round trip.

use crate::config::HttpConfig;
use crate::error::{KinoError, Result};

/// Thin client holding transport settings. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    cfg: HttpConfig,
}

impl HttpClient {
    pub fn new(cfg: HttpConfig) -> Self {
        Self { cfg }
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy> {
        let mut easy = curl::easy::Easy::new();
        let setup = |easy: &mut curl::easy::Easy| -> std::result::Result<(), curl::Error> {
            easy.url(url)?;
            easy.follow_location(true)?;
            easy.max_redirections(self.cfg.max_redirections)?;
            easy.connect_timeout(self.cfg.connect_timeout())?;
            easy.timeout(self.cfg.timeout())?;
            easy.useragent(&self.cfg.user_agent)?;
            Ok(())
        };
        setup(&mut easy).map_err(|e| KinoError::fetch(url, e.to_string()))?;
        Ok(easy)
    }

    /// GET `url` and return the body. Any non-2xx status is a fetch error.
    pub fn get(&self, url: &str) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        let mut easy = self.easy(url)?;
        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(|e| KinoError::fetch(url, e.to_string()))?;
            transfer
                .perform()
                .map_err(|e| KinoError::fetch(url, format!("GET request failed: {}", e)))?;
        }

        let code = easy
            .response_code()
            .map_err(|e| KinoError::fetch(url, e.to_string()))?;
        if !is_success(code) {
            return Err(KinoError::fetch(url, format!("GET returned HTTP {}", code)));
        }
        tracing::debug!(url, bytes = body.len(), "GET ok");
        Ok(body)
    }

    /// GET `url` and decode the body as UTF-8.
    pub fn get_text(&self, url: &str) -> Result<String> {
        let body = self.get(url)?;
        String::from_utf8(body).map_err(|e| KinoError::fetch(url, format!("body is not UTF-8: {}", e)))
    }

    /// HEAD `url`; true only when the final response status is 2xx.
    pub fn head_ok(&self, url: &str) -> Result<bool> {
        let mut easy = self.easy(url)?;
        easy.nobody(true)
            .map_err(|e| KinoError::fetch(url, e.to_string()))?;
        easy.perform()
            .map_err(|e| KinoError::fetch(url, format!("HEAD request failed: {}", e)))?;
        let code = easy
            .response_code()
            .map_err(|e| KinoError::fetch(url, e.to_string()))?;
        tracing::debug!(url, code, "HEAD");
        Ok(is_success(code))
    }
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

use crate::app::ports::{HttpClientPort, HttpGetResult};
use crate::error::Result;
use reqwest::header::CONTENT_TYPE;

pub struct ReqwestHttp;

impl HttpClientPort for ReqwestHttp {
    fn get(&self, url: &str) -> Result<HttpGetResult> {
        let resp = reqwest::blocking::get(url)?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes()?.to_vec();
        Ok(HttpGetResult { status, bytes, content_type })
    }
}

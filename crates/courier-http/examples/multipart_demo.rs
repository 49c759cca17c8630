//! Builds an upload request body and prints it.
//!
//! Run with `COURIER_LOG_LEVEL=trace` to see each part being written.

use courier_common_log::spans::{body_span, request_span, Timer};
use courier_common_log::{info, LogConfig};
use courier_http::{BytesResource, FormValue, HttpConfig, MultiResource, MultipartBody, RequestBody};
use courier_url::{TableMap, UrlBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    courier_common_log::init(LogConfig::from_env())?;
    let config = HttpConfig::from_env()?;

    let mut url = UrlBuilder::of_http("upload.example.com/api")?;
    url.add_path_segment("photos").add_query("album", "summer 2024");
    let span = request_span("POST", &url.build());
    let _request = span.enter();

    let mut photos = MultiResource::new();
    photos
        .add(BytesResource::named(&b"\x89PNG first"[..], "beach.png"))
        .add(BytesResource::named(&b"\x89PNG second"[..], "sunset.png"));

    let mut fields = TableMap::new();
    fields.put("caption".to_string(), FormValue::from("Holiday pictures"));
    fields.put("photos".to_string(), FormValue::from(photos));

    let timer = Timer::start("encode multipart");
    let body = RequestBody::from(MultipartBody::from_config(fields, &config));
    let bytes = {
        let _body = body_span("multipart").entered();
        body.to_bytes()?
    };
    timer.finish();

    info!(path = %url.path_str(), bytes = bytes.len(), "Encoded upload body");
    println!("POST {}", url.path_str());
    if let Some(content_type) = body.content_type() {
        println!("Content-Type: {}", content_type);
    }
    println!();
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

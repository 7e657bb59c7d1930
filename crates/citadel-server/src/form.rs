//! Query string and form body decoding.

use std::convert::Infallible;

use bytes::Bytes;
use citadel_core::{CitadelError, CitadelResult};
use citadel_router::Params;
use mime::Mime;

use crate::params::{Parameters, UploadedFile};

/// Fields and files decoded from a form body.
#[derive(Debug, Default)]
pub(crate) struct FormData {
    pub(crate) fields: Vec<(String, String)>,
    pub(crate) files: Vec<UploadedFile>,
}

/// Decodes a query string. `None` and `""` yield no pairs.
pub(crate) fn parse_query(query: Option<&str>) -> CitadelResult<Vec<(String, String)>> {
    match query {
        None | Some("") => Ok(Vec::new()),
        Some(query) => serde_urlencoded::from_str(query)
            .map_err(|e| CitadelError::bad_request(format!("invalid query string: {e}"))),
    }
}

/// Decodes the body when the content type is a form, `Ok(None)` otherwise.
pub(crate) async fn parse_form(
    content_type: Option<&str>,
    body: &Bytes,
) -> CitadelResult<Option<FormData>> {
    let Some(content_type) = content_type else {
        return Ok(None);
    };
    let Ok(mime) = content_type.parse::<Mime>() else {
        return Ok(None);
    };

    if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        let fields = serde_urlencoded::from_bytes(body)
            .map_err(|e| CitadelError::bad_request(format!("invalid form body: {e}")))?;
        return Ok(Some(FormData {
            fields,
            files: Vec::new(),
        }));
    }

    if mime.essence_str() == mime::MULTIPART_FORM_DATA.essence_str() {
        return parse_multipart(content_type, body.clone()).await.map(Some);
    }

    Ok(None)
}

async fn parse_multipart(content_type: &str, body: Bytes) -> CitadelResult<FormData> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| CitadelError::bad_request("missing or invalid multipart boundary"))?;

    let stream = futures_util::stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);
    let mut form = FormData::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(ToString::to_string) {
            let content_type = field.content_type().map(ToString::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            form.files.push(UploadedFile {
                field: name,
                file_name,
                content_type,
                data,
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.push((name, value));
        }
    }

    Ok(form)
}

fn multipart_error(e: multer::Error) -> CitadelError {
    CitadelError::bad_request(format!("multipart parse error: {e}"))
}

/// Merges path captures, query pairs and form data, later sources winning.
pub(crate) fn merge(
    path: &Params,
    query: Vec<(String, String)>,
    form: Option<FormData>,
) -> Parameters {
    let mut params = Parameters::new();
    params.extend(path.iter());
    params.extend(query);
    if let Some(form) = form {
        params.extend(form.fields);
        params.attach_files(form.files);
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "XyZ";

    fn multipart_body() -> Bytes {
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             Kursk\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"scenario\"; filename=\"kursk.xml\"\r\n\
             Content-Type: application/xml\r\n\r\n\
             <scenario/>\r\n\
             --{b}--\r\n",
            b = BOUNDARY
        );
        Bytes::from(body)
    }

    #[test]
    fn test_parse_query() {
        assert!(parse_query(None).unwrap().is_empty());
        assert!(parse_query(Some("")).unwrap().is_empty());

        let pairs = parse_query(Some("page=2&filter=Panzer%20IV")).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("filter".to_string(), "Panzer IV".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_urlencoded_form() {
        let body = Bytes::from_static(b"name=alice&side=Allies");
        let form = parse_form(Some("application/x-www-form-urlencoded; charset=UTF-8"), &body)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(form.fields.len(), 2);
        assert_eq!(form.fields[1], ("side".to_string(), "Allies".to_string()));
        assert!(form.files.is_empty());
    }

    #[tokio::test]
    async fn test_json_is_not_a_form() {
        let body = Bytes::from_static(b"{\"a\":1}");
        assert!(parse_form(Some("application/json"), &body).await.unwrap().is_none());
        assert!(parse_form(None, &body).await.unwrap().is_none());
        assert!(parse_form(Some("not a mime"), &body).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_multipart_form() {
        let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
        let form = parse_form(Some(&content_type), &multipart_body())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(form.fields, vec![("title".to_string(), "Kursk".to_string())]);
        assert_eq!(form.files.len(), 1);
        assert_eq!(form.files[0].field, "scenario");
        assert_eq!(form.files[0].file_name, "kursk.xml");
        assert_eq!(form.files[0].content_type.as_deref(), Some("application/xml"));
        assert_eq!(form.files[0].data, Bytes::from_static(b"<scenario/>"));
    }

    #[tokio::test]
    async fn test_multipart_without_boundary() {
        let err = parse_form(Some("multipart/form-data"), &Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_merge_order() {
        let mut path = Params::new();
        path.push("id", "from-path");
        path.push("game", "g1");

        let query = vec![("id".to_string(), "from-query".to_string())];
        let form = FormData {
            fields: vec![
                ("game".to_string(), "from-form".to_string()),
                ("side".to_string(), "Axis".to_string()),
            ],
            files: Vec::new(),
        };

        let params = merge(&path, query, Some(form));
        assert_eq!(params.text("id"), Some("from-query"));
        assert_eq!(params.text("game"), Some("from-form"));
        assert_eq!(params.text("side"), Some("Axis"));
    }
}

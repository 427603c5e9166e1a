use reqwest::multipart::{Form, Part};

use crate::client::ClientError;
use crate::events::dto::EventListResponse;

/// Client-side cap on uploaded images; the server itself enforces nothing
/// beyond the transport body limit.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub enum ImageSource {
    Upload {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
    Url(String),
}

/// Campaign creation form: file-or-URL image input, tags as free text.
#[derive(Debug, Clone)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub amount_to_raise: f64,
    pub tags: Vec<String>,
    pub image: Option<ImageSource>,
}

impl EventForm {
    pub fn into_multipart(self) -> Result<Form, ClientError> {
        if let Some(ImageSource::Upload { bytes, .. }) = &self.image {
            if bytes.len() > MAX_UPLOAD_BYTES {
                return Err(ClientError::ImageTooLarge);
            }
        }
        let tags = serde_json::to_string(&self.tags).unwrap_or_else(|_| "[]".into());
        let mut form = Form::new()
            .text("title", self.title)
            .text("description", self.description)
            .text("amountToRaise", self.amount_to_raise.to_string())
            .text("tags", tags);
        match self.image {
            Some(ImageSource::Url(url)) => form = form.text("imageUrl", url),
            Some(ImageSource::Upload {
                file_name,
                content_type,
                bytes,
            }) => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&content_type)?;
                form = form.part("uploadedImage", part);
            }
            None => {}
        }
        Ok(form)
    }
}

/// Pagination state behind the list view's prev/next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: i64,
    pub total_pages: i64,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
        }
    }
}

impl Pager {
    /// Folds a list response back in; shrinking result sets pull the current
    /// page back into range.
    pub fn apply(&mut self, response: &EventListResponse) {
        self.total_pages = response.total_pages;
        if self.total_pages > 0 && self.page > self.total_pages {
            self.page = self.total_pages;
        }
    }

    pub fn next(&mut self) {
        if self.page < self.total_pages {
            self.page += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_image_of(len: usize) -> EventForm {
        EventForm {
            title: "Well".into(),
            description: "A well".into(),
            amount_to_raise: 1000.0,
            tags: vec!["water".into()],
            image: Some(ImageSource::Upload {
                file_name: "well.png".into(),
                content_type: "image/png".into(),
                bytes: vec![0; len],
            }),
        }
    }

    #[test]
    fn images_at_the_cap_are_accepted() {
        assert!(form_with_image_of(MAX_UPLOAD_BYTES).into_multipart().is_ok());
    }

    #[test]
    fn oversized_images_are_rejected_locally() {
        let err = form_with_image_of(MAX_UPLOAD_BYTES + 1)
            .into_multipart()
            .unwrap_err();
        assert!(matches!(err, ClientError::ImageTooLarge));
    }

    #[test]
    fn url_images_skip_the_cap_entirely() {
        let form = EventForm {
            image: Some(ImageSource::Url("https://example.com/a.png".into())),
            ..form_with_image_of(0)
        };
        assert!(form.into_multipart().is_ok());
    }

    fn list_response(total_pages: i64) -> EventListResponse {
        EventListResponse {
            events: Vec::new(),
            total_pages,
            current_page: 1,
            total: 0,
        }
    }

    #[test]
    fn pager_clamps_at_both_ends() {
        let mut pager = Pager::default();
        pager.prev();
        assert_eq!(pager.page, 1);
        pager.apply(&list_response(3));
        pager.next();
        pager.next();
        pager.next();
        assert_eq!(pager.page, 3);
    }

    #[test]
    fn pager_pulls_the_page_back_when_results_shrink() {
        let mut pager = Pager {
            page: 5,
            total_pages: 5,
        };
        pager.apply(&list_response(2));
        assert_eq!(pager.page, 2);
    }
}

//! Multipart bodies for list writes: text fields `title` and `description`,
//! plus an optional `file` part carrying the attachment.

use axum::extract::multipart::{Multipart, MultipartRejection};
use listkeeper_core::{CreateList, UpdateList};
use listkeeper_service::Upload;

use super::{bad_request, ApiError};

#[derive(Debug, Default)]
pub struct ListForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub upload: Option<Upload>,
}

impl ListForm {
    pub async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, ApiError> {
        let mut multipart = multipart.map_err(|e| bad_request(e.body_text()))?;
        let mut form = ListForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "title" | "description" => {
                    let text = field.text().await.map_err(|e| bad_request(e.body_text()))?;
                    // Browsers send blank inputs; treat them as not supplied.
                    let value = (!text.is_empty()).then_some(text);
                    if name == "title" {
                        form.title = value;
                    } else {
                        form.description = value;
                    }
                }
                "file" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let data = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                    if !file_name.is_empty() || !data.is_empty() {
                        form.upload = Some(Upload::new(file_name, data));
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    pub fn into_create(self) -> (CreateList, Option<Upload>) {
        let input = CreateList::new(
            self.title.unwrap_or_default(),
            self.description.unwrap_or_default(),
        );
        (input, self.upload)
    }

    pub fn into_update(self) -> (UpdateList, Option<Upload>) {
        let update = UpdateList {
            title: self.title,
            description: self.description,
            attachment: None,
        };
        (update, self.upload)
    }
}

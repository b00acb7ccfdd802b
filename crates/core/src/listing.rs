//! Cursor-based file listing
//!
//! Both listing calls return one page and a cursor. Callers pass the cursor
//! back in to get the next page and stop once [`FilePage::cursor`] is `None`.

use serde::{Deserialize, Serialize};

use crate::bucket::Bucket;
use crate::error::{Error, Result};
use crate::file::FileMeta;

/// Where the next page starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCursor {
    pub file_name: String,
    /// Only set by version listings
    pub file_id: Option<String>,
}

/// One page of a listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePage {
    pub files: Vec<FileMeta>,
    #[serde(default)]
    pub next_file_name: Option<String>,
    #[serde(default)]
    pub next_file_id: Option<String>,
}

impl FilePage {
    /// Cursor for the next page, `None` once the listing is exhausted
    pub fn cursor(&self) -> Option<ListCursor> {
        let file_name = self.next_file_name.as_deref().filter(|s| !s.is_empty());
        let file_id = self.next_file_id.as_deref().filter(|s| !s.is_empty());

        match (file_name, file_id) {
            (None, None) => None,
            (name, id) => Some(ListCursor {
                file_name: name.unwrap_or_default().to_string(),
                file_id: id.map(str::to_string),
            }),
        }
    }

    pub fn is_last(&self) -> bool {
        self.cursor().is_none()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListFilesRequest<'a> {
    bucket_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    start_file_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    start_file_id: &'a str,
    #[serde(skip_serializing_if = "is_zero")]
    max_file_count: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl Bucket {
    /// List file names in alphabetical order, starting at `start_name`
    ///
    /// Empty `start_name` starts at the beginning; `max_count` 0 leaves the
    /// page size to the service.
    pub async fn list_file_names(&self, start_name: &str, max_count: u32) -> Result<FilePage> {
        self.list_files(
            "b2_list_file_names",
            ListFilesRequest {
                bucket_id: self.id(),
                start_file_name: start_name,
                start_file_id: "",
                max_file_count: max_count,
            },
        )
        .await
    }

    /// List every version of every file, starting at (`start_name`, `start_id`)
    ///
    /// A `start_id` needs a `start_name`; passing one without the other is
    /// rejected before anything is sent.
    pub async fn list_file_versions(
        &self,
        start_name: &str,
        start_id: &str,
        max_count: u32,
    ) -> Result<FilePage> {
        if !start_id.is_empty() && start_name.is_empty() {
            return Err(Error::Validation(
                "a start file id requires a start file name".into(),
            ));
        }

        self.list_files(
            "b2_list_file_versions",
            ListFilesRequest {
                bucket_id: self.id(),
                start_file_name: start_name,
                start_file_id: start_id,
                max_file_count: max_count,
            },
        )
        .await
    }

    async fn list_files(&self, operation: &str, request: ListFilesRequest<'_>) -> Result<FilePage> {
        let mut page: FilePage = self.session().call(operation, &request).await?;
        for file in &mut page.files {
            file.bucket = Some(self.clone());
        }

        tracing::debug!(
            bucket = self.name(),
            operation,
            files = page.files.len(),
            last = page.is_last(),
            "Listed files"
        );
        Ok(page)
    }
}

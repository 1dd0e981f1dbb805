use futures::stream::{self, Stream, TryStreamExt};
use tracing::debug;

use crate::domain::contact::ContactRecord;
use crate::domain::error::DirectoryError;
use crate::domain::ports::DirectoryPort;

struct PageCursor {
    token: Option<String>,
    page: u32,
}

/// Every connection of the account, page by page.
///
/// The stream is lazy and single-pass: a page is requested only when the
/// previous one has been consumed, and the first failing page ends the
/// stream with that error. A new call always starts from the first page.
pub fn fetch_all<'a>(
    port: &'a dyn DirectoryPort,
    access_token: &'a str,
) -> impl Stream<Item = Result<ContactRecord, DirectoryError>> + Send + 'a {
    let start = Some(PageCursor {
        token: None,
        page: 1,
    });

    stream::try_unfold(start, move |state| async move {
        let Some(cursor) = state else {
            return Ok(None);
        };

        let page = port
            .list_connections(access_token, cursor.token.as_deref())
            .await?;
        debug!(
            page = cursor.page,
            contacts = page.contacts.len(),
            has_more = page.next_page_token.as_deref().is_some_and(|t| !t.is_empty()),
            "directory page received"
        );

        let next = page
            .next_page_token
            .filter(|t| !t.is_empty())
            .map(|token| PageCursor {
                token: Some(token),
                page: cursor.page + 1,
            });
        let records = stream::iter(
            page.contacts
                .into_iter()
                .map(Ok::<ContactRecord, DirectoryError>),
        );
        Ok(Some((records, next)))
    })
    .try_flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConnectionsPage;
    use async_trait::async_trait;
    use futures::StreamExt;
    use parking_lot::Mutex;

    struct ScriptedDirectory {
        pages: Mutex<Vec<Result<ConnectionsPage, DirectoryError>>>,
        requested: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedDirectory {
        fn new(mut pages: Vec<Result<ConnectionsPage, DirectoryError>>) -> Self {
            pages.reverse();
            Self {
                pages: Mutex::new(pages),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DirectoryPort for ScriptedDirectory {
        async fn list_connections(
            &self,
            _access_token: &str,
            page_token: Option<&str>,
        ) -> Result<ConnectionsPage, DirectoryError> {
            self.requested.lock().push(page_token.map(str::to_string));
            self.pages
                .lock()
                .pop()
                .unwrap_or_else(|| Err(DirectoryError::unknown("no more scripted pages")))
        }
    }

    fn contact(id: &str) -> ContactRecord {
        ContactRecord {
            resource_name: id.into(),
            names: vec![],
            birthdays: vec![],
            photos: vec![],
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> Result<ConnectionsPage, DirectoryError> {
        Ok(ConnectionsPage {
            contacts: ids.iter().map(|id| contact(id)).collect(),
            next_page_token: next.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn follows_cursor_until_exhausted() {
        let dir = ScriptedDirectory::new(vec![
            page(&["people/1", "people/2"], Some("p2")),
            page(&[], Some("p3")),
            page(&["people/3"], None),
        ]);

        let all: Vec<ContactRecord> = fetch_all(&dir, "tok").try_collect().await.unwrap();

        let ids: Vec<_> = all.iter().map(|c| c.resource_name.as_str()).collect();
        assert_eq!(ids, ["people/1", "people/2", "people/3"]);
        assert_eq!(
            *dir.requested.lock(),
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn empty_cursor_ends_pagination() {
        let dir = ScriptedDirectory::new(vec![page(&["people/1"], Some(""))]);
        let all: Vec<ContactRecord> = fetch_all(&dir, "tok").try_collect().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(dir.requested.lock().len(), 1);
    }

    #[tokio::test]
    async fn failing_page_stops_the_stream() {
        let dir = ScriptedDirectory::new(vec![
            page(&["people/1"], Some("p2")),
            Err(DirectoryError::transient("connection timed out")),
            page(&["people/never"], None),
        ]);

        let items: Vec<_> = fetch_all(&dir, "tok").collect().await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(
            items[1].as_ref().unwrap_err(),
            &DirectoryError::transient("connection timed out")
        );
        assert_eq!(dir.requested.lock().len(), 2);
    }

    #[tokio::test]
    async fn pages_are_requested_lazily() {
        let dir = ScriptedDirectory::new(vec![
            page(&["people/1"], Some("p2")),
            page(&["people/2"], None),
        ]);

        let mut stream = Box::pin(fetch_all(&dir, "tok"));
        assert!(dir.requested.lock().is_empty());
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.resource_name, "people/1");
        assert_eq!(dir.requested.lock().len(), 1);
    }
}

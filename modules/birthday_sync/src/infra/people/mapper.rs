use crate::domain::contact::{BirthdayParts, Candidate, ContactRecord};
use crate::infra::people::dto::PersonDto;

/// `None` for people without a resource name; nothing can key them.
pub fn to_record(person: PersonDto) -> Option<ContactRecord> {
    if person.resource_name.is_empty() {
        return None;
    }

    let names = person
        .names
        .into_iter()
        .filter_map(|n| {
            let value = n.display_name.filter(|s| !s.trim().is_empty())?;
            Some(Candidate::new(value, n.metadata.primary))
        })
        .collect();

    // Year-less and partial dates are kept; the occurrence math needs month and day only.
    let birthdays = person
        .birthdays
        .into_iter()
        .filter_map(|b| b.date)
        .map(|d| BirthdayParts {
            year: d.year.filter(|y| *y != 0),
            month: d.month,
            day: d.day,
        })
        .collect();

    let photos = person
        .photos
        .into_iter()
        .filter_map(|p| {
            let url = p.url.filter(|u| !u.is_empty())?;
            Some(Candidate::new(url, p.metadata.primary))
        })
        .collect();

    Some(ContactRecord {
        resource_name: person.resource_name,
        names,
        birthdays,
        photos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::people::dto::ConnectionsResponse;

    fn parse(raw: &str) -> ConnectionsResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn maps_candidates_with_primary_flags() {
        let page = parse(
            r#"{
              "connections": [{
                "resourceName": "people/c42",
                "names": [
                  {"displayName": "Bob", "metadata": {"primary": false}},
                  {"displayName": "Robert", "metadata": {"primary": true}}
                ],
                "birthdays": [{"date": {"month": 2, "day": 29}}],
                "photos": [{"url": "https://p/x.jpg", "default": true}]
              }],
              "nextPageToken": "abc"
            }"#,
        );
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));

        let record = to_record(page.connections.into_iter().next().unwrap()).unwrap();
        assert_eq!(record.resource_name, "people/c42");
        assert_eq!(record.display_name(), Some("Robert"));
        assert_eq!(record.photo_url(), Some("https://p/x.jpg"));
        assert_eq!(
            record.birthdays,
            vec![BirthdayParts {
                year: None,
                month: Some(2),
                day: Some(29)
            }]
        );
    }

    #[test]
    fn missing_lists_and_blank_names_are_tolerated() {
        let page = parse(r#"{"connections":[{"resourceName":"people/1","names":[{"metadata":{}}, {"displayName":"  "}]}]}"#);
        let record = to_record(page.connections.into_iter().next().unwrap()).unwrap();
        assert!(record.names.is_empty());
        assert!(record.birthdays.is_empty());
        assert!(record.photos.is_empty());
        assert_eq!(record.display_name(), None);
    }

    #[test]
    fn placeholder_avatar_is_kept_as_a_photo() {
        let page = parse(
            r#"{"connections":[{"resourceName":"people/7","photos":[
                {"url":"https://p/avatar.png","default":true,"metadata":{"primary":true}}
            ]}]}"#,
        );
        let record = to_record(page.connections.into_iter().next().unwrap()).unwrap();
        assert_eq!(record.photo_url(), Some("https://p/avatar.png"));
    }

    #[test]
    fn people_without_resource_name_are_dropped() {
        let page = parse(r#"{"connections":[{"names":[{"displayName":"Ghost"}]}]}"#);
        assert!(to_record(page.connections.into_iter().next().unwrap()).is_none());
    }

    #[test]
    fn empty_body_is_an_empty_last_page() {
        let page = parse("{}");
        assert!(page.connections.is_empty());
        assert!(page.next_page_token.is_none());
    }
}

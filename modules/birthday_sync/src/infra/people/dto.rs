//! Wire shapes of `people/me/connections`. Every list field may be absent.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsResponse {
    #[serde(default)]
    pub connections: Vec<PersonDto>,
    pub next_page_token: Option<String>,
    pub total_people: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDto {
    #[serde(default)]
    pub resource_name: String,
    #[serde(default)]
    pub names: Vec<NameDto>,
    #[serde(default)]
    pub birthdays: Vec<BirthdayDto>,
    #[serde(default)]
    pub photos: Vec<PhotoDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadataDto {
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameDto {
    pub display_name: Option<String>,
    #[serde(default)]
    pub metadata: FieldMetadataDto,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateDto {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthdayDto {
    pub date: Option<DateDto>,
    #[serde(default)]
    pub metadata: FieldMetadataDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDto {
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: FieldMetadataDto,
}

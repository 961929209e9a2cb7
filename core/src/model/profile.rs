// core/src/model/profile.rs

//! Artisan profile data, its partial-update DTO and the field catalogue used for
//! change tracking.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
  pub city: String,
  pub state: String,
  pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
  pub business_name: String,
  pub business_type: String,
  pub registration_number: Option<String>,
  pub tax_id: Option<String>,
  pub phone: Option<String>,
  pub email: Option<String>,
}

/// References to verification documents. Storage of the files themselves lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Documents {
  pub identity_proof: Option<String>,
  pub business_license: Option<String>,
  #[serde(default)]
  pub additional: Vec<String>,
}

/// Everything an artisan submits at onboarding and may later edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanProfile {
  pub name: String,
  #[serde(default)]
  pub bio: String,
  pub avatar_url: Option<String>,
  pub banner_url: Option<String>,
  #[serde(default)]
  pub specialties: Vec<String>,
  #[serde(default)]
  pub craft_description: String,
  #[serde(default)]
  pub location: Location,
  pub business_info: BusinessInfo,
  #[serde(default)]
  pub documents: Documents,
}

/// Every editable profile field, by its dotted JSON path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
  Name,
  Bio,
  AvatarUrl,
  BannerUrl,
  Specialties,
  CraftDescription,
  LocationCity,
  LocationState,
  LocationCountry,
  BusinessName,
  BusinessType,
  RegistrationNumber,
  TaxId,
  BusinessPhone,
  BusinessEmail,
  IdentityProof,
  BusinessLicense,
  AdditionalDocuments,
}

impl ProfileField {
  pub fn path(&self) -> &'static str {
    match self {
      ProfileField::Name => "name",
      ProfileField::Bio => "bio",
      ProfileField::AvatarUrl => "avatarUrl",
      ProfileField::BannerUrl => "bannerUrl",
      ProfileField::Specialties => "specialties",
      ProfileField::CraftDescription => "craftDescription",
      ProfileField::LocationCity => "location.city",
      ProfileField::LocationState => "location.state",
      ProfileField::LocationCountry => "location.country",
      ProfileField::BusinessName => "businessInfo.businessName",
      ProfileField::BusinessType => "businessInfo.businessType",
      ProfileField::RegistrationNumber => "businessInfo.registrationNumber",
      ProfileField::TaxId => "businessInfo.taxId",
      ProfileField::BusinessPhone => "businessInfo.phone",
      ProfileField::BusinessEmail => "businessInfo.email",
      ProfileField::IdentityProof => "documents.identityProof",
      ProfileField::BusinessLicense => "documents.businessLicense",
      ProfileField::AdditionalDocuments => "documents.additional",
    }
  }

  /// Whether an edit to this field needs admin re-review once the artisan is approved.
  /// Only the purely cosmetic images are exempt.
  pub fn is_reviewable(&self) -> bool {
    !matches!(self, ProfileField::AvatarUrl | ProfileField::BannerUrl)
  }
}

impl fmt::Display for ProfileField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.path())
  }
}

/// One field whose value actually changed, with the new value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
  pub field: ProfileField,
  pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocationUpdate {
  pub city: Option<String>,
  pub state: Option<String>,
  pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BusinessInfoUpdate {
  pub business_name: Option<String>,
  pub business_type: Option<String>,
  pub registration_number: Option<String>,
  pub tax_id: Option<String>,
  pub phone: Option<String>,
  pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentsUpdate {
  pub identity_proof: Option<String>,
  pub business_license: Option<String>,
  pub additional: Option<Vec<String>>,
}

/// Self-service profile edit. Absent fields are left alone; unknown fields are
/// rejected at deserialization, so only the fields listed here can ever be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
  pub name: Option<String>,
  pub bio: Option<String>,
  pub avatar_url: Option<String>,
  pub banner_url: Option<String>,
  pub specialties: Option<Vec<String>>,
  pub craft_description: Option<String>,
  pub location: Option<LocationUpdate>,
  pub business_info: Option<BusinessInfoUpdate>,
  pub documents: Option<DocumentsUpdate>,
}

impl ProfileUpdate {
  pub fn is_empty(&self) -> bool {
    *self == ProfileUpdate::default()
  }

  /// Writes the present fields into `profile` and returns the ones whose value
  /// actually changed, in declaration order.
  pub fn apply_to(&self, profile: &mut ArtisanProfile) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    let c = &mut changes;

    assign(&mut profile.name, &self.name, ProfileField::Name, c);
    assign(&mut profile.bio, &self.bio, ProfileField::Bio, c);
    assign_opt(&mut profile.avatar_url, &self.avatar_url, ProfileField::AvatarUrl, c);
    assign_opt(&mut profile.banner_url, &self.banner_url, ProfileField::BannerUrl, c);
    assign(&mut profile.specialties, &self.specialties, ProfileField::Specialties, c);
    assign(
      &mut profile.craft_description,
      &self.craft_description,
      ProfileField::CraftDescription,
      c,
    );

    if let Some(loc) = &self.location {
      let target = &mut profile.location;
      assign(&mut target.city, &loc.city, ProfileField::LocationCity, c);
      assign(&mut target.state, &loc.state, ProfileField::LocationState, c);
      assign(&mut target.country, &loc.country, ProfileField::LocationCountry, c);
    }

    if let Some(biz) = &self.business_info {
      let target = &mut profile.business_info;
      assign(&mut target.business_name, &biz.business_name, ProfileField::BusinessName, c);
      assign(&mut target.business_type, &biz.business_type, ProfileField::BusinessType, c);
      assign_opt(
        &mut target.registration_number,
        &biz.registration_number,
        ProfileField::RegistrationNumber,
        c,
      );
      assign_opt(&mut target.tax_id, &biz.tax_id, ProfileField::TaxId, c);
      assign_opt(&mut target.phone, &biz.phone, ProfileField::BusinessPhone, c);
      assign_opt(&mut target.email, &biz.email, ProfileField::BusinessEmail, c);
    }

    if let Some(docs) = &self.documents {
      let target = &mut profile.documents;
      assign_opt(&mut target.identity_proof, &docs.identity_proof, ProfileField::IdentityProof, c);
      assign_opt(
        &mut target.business_license,
        &docs.business_license,
        ProfileField::BusinessLicense,
        c,
      );
      assign(&mut target.additional, &docs.additional, ProfileField::AdditionalDocuments, c);
    }

    changes
  }
}

fn assign<T>(slot: &mut T, incoming: &Option<T>, field: ProfileField, changes: &mut Vec<FieldChange>)
where
  T: PartialEq + Clone + Serialize,
{
  if let Some(value) = incoming {
    if slot != value {
      *slot = value.clone();
      changes.push(FieldChange {
        field,
        value: serde_json::to_value(value).unwrap_or(Value::Null),
      });
    }
  }
}

fn assign_opt<T>(slot: &mut Option<T>, incoming: &Option<T>, field: ProfileField, changes: &mut Vec<FieldChange>)
where
  T: PartialEq + Clone + Serialize,
{
  if let Some(value) = incoming {
    if slot.as_ref() != Some(value) {
      *slot = Some(value.clone());
      changes.push(FieldChange {
        field,
        value: serde_json::to_value(value).unwrap_or(Value::Null),
      });
    }
  }
}

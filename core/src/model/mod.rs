// core/src/model/mod.rs

//! Domain records and the inputs that act on them.

pub mod artisan;
pub mod blog;
pub mod decision;
pub mod page;
pub mod product;
pub mod profile;
pub mod review;

pub use artisan::{Artisan, ChangeRecord, OnboardingState, OnboardingStatus, PendingChanges};
pub use blog::{BlogEffect, BlogPost, NewBlogPost, PublicationStatus};
pub use decision::{Decision, Verdict};
pub use page::{ListQuery, Page, SortOrder, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use product::{NewProduct, Product, ProductEffect};
pub use profile::{
  ArtisanProfile, BusinessInfo, BusinessInfoUpdate, Documents, DocumentsUpdate, FieldChange, Location,
  LocationUpdate, ProfileField, ProfileUpdate,
};
pub use review::{ApprovalStatus, Review};

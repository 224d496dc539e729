use serde::{Deserialize, Serialize};

pub mod auth;
pub mod company;
pub mod contact;
pub mod custom_field;
pub mod field;
pub mod import;
pub mod task;

pub use auth::{LoginRequest, LoginResponse, RegisterRequest, User, UsersResponse};
pub use company::{CompaniesResponse, Company, CreateCompanyRequest};
pub use contact::{
    Contact, ContactFormResponse, ContactsResponse, CreateContactRequest, FormField,
    SaveContactFormRequest, UpdateContactRequest,
};
pub use custom_field::{
    slugify_key, CreateCustomFieldRequest, CustomFieldDefinition, CustomFieldType,
    CustomFieldsResponse, CUSTOM_PREFIX,
};
pub use field::{
    parse_bool, parse_date, parse_integer, split_list, ContactField, FieldDescriptor, FieldKind,
    FieldValue,
};
pub use import::{
    CsvColumnMapping, GetColumnsRequest, GetColumnsResponse, ImportResult,
    ImportWithMappingRequest, KnownColumn, MappingTarget, UnknownTarget,
};
pub use task::{
    CreateTaskRequest, Task, TaskPriority, TaskStatus, TasksResponse, UpdateTaskRequest,
};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for API types
    let mut types = Vec::new();

    // Field types
    types.push(clean_type(ContactField::export_to_string()?));
    types.push(clean_type(FieldKind::export_to_string()?));
    types.push(clean_type(FieldValue::export_to_string()?));
    types.push(clean_type(FieldDescriptor::export_to_string()?));

    // Contact types
    types.push(clean_type(Contact::export_to_string()?));
    types.push(clean_type(CreateContactRequest::export_to_string()?));
    types.push(clean_type(UpdateContactRequest::export_to_string()?));
    types.push(clean_type(ContactsResponse::export_to_string()?));
    types.push(clean_type(FormField::export_to_string()?));
    types.push(clean_type(ContactFormResponse::export_to_string()?));
    types.push(clean_type(SaveContactFormRequest::export_to_string()?));

    // Custom field types
    types.push(clean_type(CustomFieldType::export_to_string()?));
    types.push(clean_type(CustomFieldDefinition::export_to_string()?));
    types.push(clean_type(CreateCustomFieldRequest::export_to_string()?));
    types.push(clean_type(CustomFieldsResponse::export_to_string()?));

    // Company types
    types.push(clean_type(Company::export_to_string()?));
    types.push(clean_type(CreateCompanyRequest::export_to_string()?));
    types.push(clean_type(CompaniesResponse::export_to_string()?));

    // Task types
    types.push(clean_type(Task::export_to_string()?));
    types.push(clean_type(TaskStatus::export_to_string()?));
    types.push(clean_type(TaskPriority::export_to_string()?));
    types.push(clean_type(CreateTaskRequest::export_to_string()?));
    types.push(clean_type(UpdateTaskRequest::export_to_string()?));
    types.push(clean_type(TasksResponse::export_to_string()?));

    // CSV import types
    types.push(clean_type(ImportResult::export_to_string()?));
    types.push(clean_type(KnownColumn::export_to_string()?));
    types.push(clean_type(GetColumnsRequest::export_to_string()?));
    types.push(clean_type(GetColumnsResponse::export_to_string()?));
    types.push(clean_type(ImportWithMappingRequest::export_to_string()?));

    // Auth types
    types.push(clean_type(User::export_to_string()?));
    types.push(clean_type(RegisterRequest::export_to_string()?));
    types.push(clean_type(LoginRequest::export_to_string()?));
    types.push(clean_type(LoginResponse::export_to_string()?));
    types.push(clean_type(UsersResponse::export_to_string()?));

    let output_dir = Path::new("../frontend/src/api-types");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    // Types that reference other exported types carry their own import lines
    let lines: Vec<&str> = type_def.lines().collect();
    let has_import = lines
        .iter()
        .any(|line| line.trim().starts_with("import type"));

    let filtered: Vec<&str> = lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with("import type") {
                return has_import;
            }
            !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .cloned()
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}

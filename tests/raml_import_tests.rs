//! RAML import tests

use collection_import_sdk::config::{ImporterConfig, RamlSection};
use collection_import_sdk::import::{CollectionImporter, ImportStage};
use collection_import_sdk::models::{BodyMode, HttpMethod, Item};

const PETSTORE_RAML: &str = r#"#%RAML 1.0
title: Pet Store
version: v1
baseUri: https://petstore.example.com/{version}
mediaType: application/json
/pets:
  displayName: Pets
  get:
    description: List every pet
    queryParameters:
      limit:
        type: integer
        required: true
      tag?:
        type: string
  post:
    headers:
      X-Request-Id:
        example: req-1
    body:
      application/json:
        example: |
          {"name": "Rex"}
  /{petId}:
    uriParameters:
      petId:
        type: string
    get:
      displayName: Get pet
    delete:
    /photos:
      post:
        body:
          multipart/form-data:
            properties:
              file:
                type: file
                required: true
              caption:
                type: string
                example: On the beach
"#;

fn folder<'a>(items: &'a [Item], name: &str) -> &'a [Item] {
    items
        .iter()
        .find_map(|item| item.as_folder().filter(|f| f.name == name))
        .map(|f| f.items.as_slice())
        .unwrap_or_else(|| panic!("folder {} not found", name))
}

mod raml_tree_tests {
    use super::*;

    #[test]
    fn test_nested_resources_become_folders() {
        let raml = r#"{ "/pets": { "get": {}, "/{id}": { "get": {} } } }"#;
        let collection = CollectionImporter::new()
            .import_str(raml, Some("pets.raml"))
            .unwrap();

        assert_eq!(collection.items.len(), 1);
        let pets = folder(&collection.items, "pets");
        assert_eq!(pets.len(), 2);

        let list = pets[0].as_request().unwrap();
        assert_eq!(list.name, "GET /pets");
        assert_eq!(list.request.url, "{{baseUri}}/pets");
        assert!(list.request.vars.req.is_empty());

        let by_id = folder(pets, "{id}");
        let get = by_id[0].as_request().unwrap();
        assert_eq!(get.name, "GET /pets/{id}");
        assert_eq!(get.request.url, "{{baseUri}}/pets/{{id}}");
        assert_eq!(get.request.vars.req.len(), 1);
        assert_eq!(get.request.vars.req[0].name, "{{id}}");
        assert!(!get.request.vars.req[0].local);
    }

    #[test]
    fn test_items_follow_source_order() {
        let collection = CollectionImporter::new()
            .import_str(PETSTORE_RAML, Some("petstore.raml"))
            .unwrap();
        let pets = folder(&collection.items, "pets");
        let names: Vec<&str> = pets.iter().map(Item::name).collect();
        assert_eq!(names, vec!["GET /pets", "POST /pets", "{petId}"]);

        let pet = folder(pets, "{petId}");
        let names: Vec<&str> = pet.iter().map(Item::name).collect();
        assert_eq!(names, vec!["Get pet", "DELETE /pets/{petId}", "photos"]);
    }

    #[test]
    fn test_structural_keywords_are_ignored_unless_method_or_path() {
        let collection = CollectionImporter::new()
            .import_str(PETSTORE_RAML, Some("petstore.raml"))
            .unwrap();
        // title, version, baseUri and mediaType yield nothing
        assert_eq!(collection.items.len(), 1);
        assert_eq!(collection.name, "Pet Store");
    }

    #[test]
    fn test_excluded_keys_drop_resources_and_methods() {
        let raml = "#%RAML 1.0\ntitle: T\n/pets:\n  get: {}\n  options: {}\n/admin:\n  get: {}\n";
        let default = CollectionImporter::new().import_str(raml, None).unwrap();
        assert_eq!(default.requests().len(), 3);

        let config = ImporterConfig {
            raml: RamlSection {
                excluded_keys: vec!["/admin".to_string(), "options".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let excluded = CollectionImporter::new()
            .with_config(config)
            .import_str(raml, None)
            .unwrap();
        assert_eq!(excluded.items.len(), 1);
        assert_eq!(excluded.requests().len(), 1);
        assert_eq!(excluded.requests()[0].name, "GET /pets");
    }
}

mod raml_request_tests {
    use super::*;

    #[test]
    fn test_query_parameters_and_docs() {
        let collection = CollectionImporter::new()
            .import_str(PETSTORE_RAML, Some("petstore.raml"))
            .unwrap();
        let list = folder(&collection.items, "pets")[0].as_request().unwrap();

        assert_eq!(list.request.method, HttpMethod::Get);
        assert_eq!(list.request.docs, "List every pet");
        let params: Vec<(&str, bool)> = list
            .request
            .params
            .iter()
            .map(|p| (p.name.as_str(), p.enabled))
            .collect();
        assert_eq!(params, vec![("limit", true), ("tag", false)]);
    }

    #[test]
    fn test_header_example_and_json_body() {
        let collection = CollectionImporter::new()
            .import_str(PETSTORE_RAML, Some("petstore.raml"))
            .unwrap();
        let create = folder(&collection.items, "pets")[1].as_request().unwrap();

        assert_eq!(create.request.headers[0].name, "X-Request-Id");
        assert_eq!(create.request.headers[0].value, "req-1");
        assert_eq!(create.request.body.mode, BodyMode::Json);
        assert!(create.request.body.json.as_deref().unwrap().contains("Rex"));
    }

    #[test]
    fn test_multipart_form_fields() {
        let collection = CollectionImporter::new()
            .import_str(PETSTORE_RAML, Some("petstore.raml"))
            .unwrap();
        let pet = folder(folder(&collection.items, "pets"), "{petId}");
        let photos = folder(pet, "photos");
        let upload = photos[0].as_request().unwrap();

        assert_eq!(upload.request.url, "{{baseUri}}/pets/{{petId}}/photos");
        let body = &upload.request.body;
        assert_eq!(body.mode, BodyMode::MultipartForm);
        assert_eq!(body.multipart_form[0].name, "file");
        assert!(body.multipart_form[0].enabled);
        assert_eq!(body.multipart_form[1].value, "On the beach");
        assert!(!body.multipart_form[1].enabled);
    }

    #[test]
    fn test_requests_have_no_auth() {
        let collection = CollectionImporter::new()
            .import_str(PETSTORE_RAML, Some("petstore.raml"))
            .unwrap();
        assert!(
            collection
                .requests()
                .iter()
                .all(|r| r.request.auth.basic.is_none() && r.request.auth.bearer.is_none())
        );
    }
}

mod raml_error_tests {
    use super::*;

    #[test]
    fn test_invalid_yaml_names_raml() {
        let err = CollectionImporter::new()
            .import_str("#%RAML 1.0\n/pets: {get: [}\n", Some("api.raml"))
            .unwrap_err();
        assert_eq!(err.stage, ImportStage::Parse);
        assert_eq!(
            err.to_string(),
            "An error occurred while parsing the RAML collection"
        );
    }

    #[test]
    fn test_root_sequence_is_rejected() {
        let err = CollectionImporter::new()
            .import_str("#%RAML 1.0\n- a\n- b\n", None)
            .unwrap_err();
        assert_eq!(err.stage, ImportStage::Convert);
        assert_eq!(err.to_string(), "Import collection failed");
    }
}

//! End-to-end tests: OpenAPI document -> walker -> generator -> files on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use dtoforge_core::{
    ConfigError, CustomTypeMapping, CustomTypeRegistry, Dialect, Dto, GenerateConfig,
    GenerateError, Generator, IO_TS, OpenApiDocument, ZOD, walk_schemas,
};
use tempfile::TempDir;

const PETSTORE: &str = r#"
openapi: 3.0.3
info: { title: Pets, version: "1.0" }
paths: {}
components:
  schemas:
    User:
      type: object
      description: A registered user
      required: [id, name]
      properties:
        name: { type: string }
        id: { type: string }
        email: { type: string, format: email }
        age: { type: integer }
        address: { $ref: '#/components/schemas/Address' }
        tags:
          type: array
          items: { type: string, format: uuid }
        status: { $ref: '#/components/schemas/Status' }
    Address:
      type: object
      required: [city]
      properties:
        city: { type: string }
        zip: { type: string, nullable: true }
    Status:
      type: string
      enum: [active, inactive, banned]
"#;

fn dtos(yaml: &str) -> Vec<Dto> {
    let document = OpenApiDocument::from_yaml(yaml).unwrap();
    let output = walk_schemas(document.schemas()).unwrap();
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    output.dtos
}

fn write_config(dir: &Path, yaml: &str) -> std::path::PathBuf {
    let path = dir.join("dtoforge.config.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

fn config_for(out: &Path, config_file: Option<std::path::PathBuf>) -> GenerateConfig {
    GenerateConfig {
        config_file,
        output_folder: Some(out.to_path_buf()),
        package_name: None,
    }
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

fn read_all(dir: &Path) -> Vec<(String, String)> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            (name, fs::read_to_string(&path).unwrap())
        })
        .collect();
    files.sort();
    files
}

fn exported_consts(source: &str) -> BTreeSet<String> {
    source
        .lines()
        .filter_map(|line| line.strip_prefix("export const "))
        .filter_map(|rest| rest.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[test]
fn test_user_example_zod() {
    let dir = TempDir::new().unwrap();
    let report = Generator::new(&ZOD)
        .generate(&dtos(PETSTORE), &config_for(dir.path(), None))
        .unwrap();

    assert!(report.diagnostics.is_empty());
    assert_eq!(report.written.len(), 5);
    assert!(report.skipped.is_empty());

    let user = read(dir.path(), "user.ts");
    assert!(user.contains("import { z } from 'zod';\n"));
    assert!(user.contains("import { AddressSchema } from './address';\n"));
    assert!(user.contains("import { StatusSchema } from './status';\n"));
    assert!(user.contains("/** A registered user */\nexport const UserSchema = z.object({\n"));
    assert!(user.contains("  id: z.string(),\n"));
    assert!(user.contains("  name: z.string(),\n"));
    assert!(user.contains("  email: z.string().email().optional(),\n"));
    assert!(user.contains("  age: z.number().optional(),\n"));
    assert!(user.contains("  address: AddressSchema.optional(),\n"));
    assert!(user.contains("  tags: z.array(z.string().uuid()).optional(),\n"));
    assert!(user.contains("export type User = z.infer<typeof UserSchema>;\n"));

    let address = read(dir.path(), "address.ts");
    assert!(address.contains("  zip: z.string().nullable().optional(),\n"));

    let status = read(dir.path(), "status.ts");
    assert!(status.contains("z.enum([\n  'active',\n  'inactive',\n  'banned',\n])"));

    let index = read(dir.path(), "index.ts");
    assert!(index.contains(
        "export * from './address';\nexport * from './status';\nexport * from './user';\n"
    ));

    let manifest: serde_json::Value =
        serde_json::from_str(&read(dir.path(), "package.json")).unwrap();
    assert_eq!(manifest["name"], "generated-zod-schemas");
}

#[test]
fn test_user_example_io_ts() {
    let dir = TempDir::new().unwrap();
    Generator::new(&IO_TS)
        .generate(&dtos(PETSTORE), &config_for(dir.path(), None))
        .unwrap();

    let user = read(dir.path(), "user.ts");
    assert!(user.contains("export const UserCodec = t.type({\n"));
    assert!(user.contains("  id: t.string,\n"));
    assert!(user.contains("  email: t.union([t.string, t.undefined]),\n"));
    assert!(user.contains("  tags: t.union([t.array(t.string), t.undefined]),\n"));
    assert!(user.contains("import { AddressCodec } from './address';\n"));

    let status = read(dir.path(), "status.ts");
    assert!(status.contains("export const StatusCodec = t.keyof(StatusValues);\n"));
}

#[test]
fn test_generation_is_deterministic() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let mut reversed = dtos(PETSTORE);
    reversed.reverse();

    let generator = Generator::new(&ZOD);
    generator
        .generate(&dtos(PETSTORE), &config_for(first.path(), None))
        .unwrap();
    generator
        .generate(&reversed, &config_for(second.path(), None))
        .unwrap();

    assert_eq!(read_all(first.path()), read_all(second.path()));
}

#[test]
fn test_layout_equivalence() {
    let multiple = TempDir::new().unwrap();
    let single = TempDir::new().unwrap();
    let config = write_config(
        single.path(),
        "typescript-zod:\n  output:\n    mode: single\n  generation:\n    generatePackageJson: false\n    generateHelpers: false\n",
    );

    let generator = Generator::new(&ZOD);
    generator
        .generate(&dtos(PETSTORE), &config_for(multiple.path(), None))
        .unwrap();
    let out = single.path().join("out");
    let report = generator
        .generate(&dtos(PETSTORE), &config_for(&out, Some(config)))
        .unwrap();
    assert_eq!(report.written, vec![out.join("schemas.ts")]);

    let multiple_exports: BTreeSet<String> = ["address.ts", "status.ts", "user.ts"]
        .iter()
        .flat_map(|file| exported_consts(&read(multiple.path(), file)))
        .collect();
    let single_file = read(&out, "schemas.ts");
    let single_exports = exported_consts(&single_file);
    assert_eq!(multiple_exports, single_exports);

    // Referenced schemas are declared before their users.
    let address = single_file.find("export const AddressSchema").unwrap();
    let user = single_file.find("export const UserSchema").unwrap();
    assert!(address < user);
    assert_eq!(single_file.matches("import { z } from 'zod';").count(), 1);
}

#[test]
fn test_override_import_appears_once() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        dir.path(),
        r#"
customTypes:
  uuid:
    ioTsType: UUID.codec
    typeScriptType: UUID
    import: "import { UUID } from './branded-types';"
"#,
    );
    let yaml = r#"
components:
  schemas:
    Order:
      type: object
      required: [id]
      properties:
        id: { type: string, format: uuid }
        parent: { type: string, format: uuid }
        related: { type: array, items: { type: string, format: uuid } }
"#;
    let out = dir.path().join("out");
    Generator::new(&IO_TS)
        .generate(&dtos(yaml), &config_for(&out, Some(config)))
        .unwrap();

    let order = read(&out, "order.ts");
    assert_eq!(order.matches("import { UUID } from './branded-types';").count(), 1);
    assert!(order.contains("  id: UUID.codec,\n"));
    assert!(order.contains("  parent: t.union([UUID.codec, t.undefined]),\n"));
    assert!(order.contains("  related: t.union([t.array(UUID.codec), t.undefined]),\n"));
}

#[test]
fn test_minimal_imports() {
    let dir = TempDir::new().unwrap();
    let yaml = r#"
components:
  schemas:
    Point:
      type: object
      required: [x, y]
      properties:
        x: { type: number }
        y: { type: number }
        label: { type: string }
"#;
    Generator::new(&IO_TS)
        .generate(&dtos(yaml), &config_for(dir.path(), None))
        .unwrap();

    let point = read(dir.path(), "point.ts");
    let imports: Vec<_> = point.lines().filter(|l| l.starts_with("import ")).collect();
    assert_eq!(imports, vec!["import * as t from 'io-ts';"]);
}

#[test]
fn test_existing_manifest_is_kept() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("package.json");
    fs::write(&manifest, "{\"name\": \"hand-edited\"}\n").unwrap();

    let report = Generator::new(&ZOD)
        .generate(&dtos(PETSTORE), &config_for(dir.path(), None))
        .unwrap();

    assert_eq!(report.skipped, vec![manifest.clone()]);
    assert_eq!(fs::read_to_string(&manifest).unwrap(), "{\"name\": \"hand-edited\"}\n");
}

#[test]
fn test_invalid_mode_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "output:\n  mode: sideways\n");
    let out = dir.path().join("out");

    let err = Generator::new(&IO_TS)
        .generate(&dtos(PETSTORE), &config_for(&out, Some(config)))
        .unwrap_err();

    assert!(matches!(
        err,
        GenerateError::Config(ConfigError::InvalidMode { ref value }) if value == "sideways"
    ));
    assert!(!out.exists());
}

#[test]
fn test_one_file_configures_both_dialects() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        dir.path(),
        r#"
output:
  mode: single
  singleFileName: codecs.ts
typescript-zod:
  output:
    singleFileName: ignored.ts
  customTypes:
    email:
      zodType: EmailSchema
      import: "import { EmailSchema } from './branded-types';"
"#,
    );

    let io_ts_out = dir.path().join("io-ts");
    Generator::new(&IO_TS)
        .generate(&dtos(PETSTORE), &config_for(&io_ts_out, Some(config.clone())))
        .unwrap();
    assert!(io_ts_out.join("codecs.ts").exists());
    assert!(!io_ts_out.join("index.ts").exists());

    let zod_out = dir.path().join("zod");
    Generator::new(&ZOD)
        .generate(&dtos(PETSTORE), &config_for(&zod_out, Some(config)))
        .unwrap();
    assert!(zod_out.join("index.ts").exists());
    let user = read(&zod_out, "user.ts");
    assert!(user.contains("import { EmailSchema } from './branded-types';\n"));
    assert!(user.contains("  email: EmailSchema.optional(),\n"));
}

#[test]
fn test_registry_overrides_in_code() {
    let registry = CustomTypeRegistry::builder(&ZOD)
        .register("email", CustomTypeMapping::new("Email", "Email", ""))
        .build();
    let planned = Generator::new(&ZOD)
        .plan(&dtos(PETSTORE), &registry, &GenerateConfig::default())
        .unwrap();
    let user = &planned.plan.file("user.ts").unwrap().contents;
    assert!(user.contains("  email: Email.optional(),\n"));
}

#[test]
fn test_every_dialect_generates() {
    for language in Dialect::available() {
        let dialect = Dialect::from_language(language).unwrap();
        let dir = TempDir::new().unwrap();
        let report = Generator::new(dialect)
            .generate(&dtos(PETSTORE), &config_for(dir.path(), None))
            .unwrap();
        assert_eq!(report.written.len(), 5, "{language}");
    }
}

#[test]
fn test_output_folder_that_is_a_file_fails() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("generated");
    fs::write(&blocker, "not a directory").unwrap();

    let err = Generator::new(&ZOD)
        .generate(&dtos(PETSTORE), &config_for(&blocker, None))
        .unwrap_err();

    assert!(matches!(err, GenerateError::Io { ref path, .. } if *path == blocker));
    assert!(err.to_string().contains("generated"));
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
}

#[test]
fn test_failed_write_keeps_earlier_files() {
    let dir = TempDir::new().unwrap();
    let blocked = dir.path().join("user.ts");
    fs::create_dir(&blocked).unwrap();

    let err = Generator::new(&ZOD)
        .generate(&dtos(PETSTORE), &config_for(dir.path(), None))
        .unwrap_err();

    assert!(matches!(err, GenerateError::Io { ref path, .. } if *path == blocked));
    // Files planned before user.ts stay on disk; later ones are never written.
    assert!(dir.path().join("address.ts").is_file());
    assert!(dir.path().join("status.ts").is_file());
    assert!(!dir.path().join("index.ts").exists());
    assert!(!dir.path().join("package.json").exists());
}

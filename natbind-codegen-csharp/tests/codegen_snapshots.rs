//! Snapshot tests for C# code generation.
//!
//! Each test drives the whole generator from a natbind.toml manifest.
//! Run `cargo insta review` to update snapshots when making intentional changes.

use std::str::FromStr;

use natbind_codegen::Diagnostic;
use natbind_codegen_csharp::{
    DEFAULT_NAMESPACE, GenerateOutput, Generator, GeneratorOptions, LanguageCodegen,
};
use natbind_manifest::Manifest;
use tempfile::TempDir;

/// Parse a manifest and run both generator passes without writing.
fn generate(manifest_toml: &str) -> GenerateOutput {
    let manifest = Manifest::from_str(manifest_toml).expect("Failed to parse manifest");
    let decls = manifest
        .declarations()
        .expect("Failed to resolve declarations");
    let options = GeneratorOptions {
        namespace: manifest
            .generator
            .namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        tool: manifest.generator.tool_info(),
    };
    Generator::new(&decls.compilation, &decls.members)
        .with_options(options)
        .preview()
        .expect("Failed to generate")
}

fn unit<'a>(output: &'a GenerateOutput, name: &str) -> &'a str {
    output
        .file(name)
        .map(|f| f.content.as_str())
        .unwrap_or_else(|| panic!("{name} not generated"))
}

fn diagnostic_ids(output: &GenerateOutput) -> Vec<&str> {
    diagnostic_ids_of(&output.diagnostics)
}

fn diagnostic_ids_of(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.id.as_str()).collect()
}

const HEADER: &str = r#"
[generator]
namespace = "Demo.Gen"
tool = "natbind"
version = "0.1.0"
"#;

#[test]
fn test_hello_world_constant() {
    let output = generate(&format!(
        r#"{HEADER}
[[members]]
container = "Demo.Consts"
name = "Greeting"
shape = "property"
returns = "string"
[members.constant]
format = "Hello, {{0}}!"
args = ["World"]
"#
    ));

    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    insta::assert_snapshot!(
        "hello_world_constants",
        unit(&output, "Demo.Gen.FormattedConstants.g.cs")
    );
}

#[test]
fn test_shared_symbol_uses_one_slot() {
    let output = generate(&format!(
        r#"{HEADER}
[types."Demo.SdlLibrary"]

[[members]]
container = "Demo.Sdl"
name = "Init"
returns = "uint"
params = [{{ name = "flags", type = "uint" }}]
[members.function]
library = "Demo.SdlLibrary"
name = "SDL_Init"

[[members]]
container = "Demo.Sdl"
name = "InitSubSystem"
returns = "uint"
params = [{{ name = "flags", type = "uint" }}]
[members.function]
library = "Demo.SdlLibrary"
name = "SDL_Init"
"#
    ));

    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let imports = unit(&output, "Demo.Gen.NativeImports.g.cs");
    assert_eq!(imports.matches("internal static global::System.IntPtr _Sym").count(), 1);
    assert_eq!(imports.matches("NativeLibrary.GetExport(").count(), 1);
    assert_eq!(imports.matches("global::_Lib0._Sym0)(flags);").count(), 2);
    insta::assert_snapshot!("sdl_init_shared_slot", imports);
}

#[test]
fn test_auto_kind_resolves_to_setter() {
    let output = generate(&format!(
        r#"{HEADER}
[types."Demo.AudioLibrary"]

[[members]]
container = "Demo.Audio"
name = "SetVolume"
params = [{{ name = "value", type = "float" }}]
[members.symbol]
library = "Demo.AudioLibrary"
name = "g_volume"
kind = "auto"
"#
    ));

    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let imports = unit(&output, "Demo.Gen.NativeImports.g.cs");
    assert!(imports.contains("internal static partial void SetVolume(float value)"));
    assert!(imports.contains("*unchecked((float*)global::_Lib0._Sym0) = value;"));
    assert!(imports.contains("// Symbol: g_volume"));
}

#[test]
fn test_blank_symbol_name_still_binds() {
    let output = generate(&format!(
        r#"{HEADER}
[types."Demo.SdlLibrary"]

[[members]]
container = "Demo.Sdl"
name = "Quit"
[members.function]
library = "Demo.SdlLibrary"
name = "   "
"#
    ));

    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let imports = unit(&output, "Demo.Gen.NativeImports.g.cs");
    assert_eq!(imports.matches("internal static global::System.IntPtr _Sym").count(), 1);
    assert!(imports.contains("if (!string.IsNullOrWhiteSpace(\"   \"))"));
    assert!(imports.contains("HandleSymbolImportError<global::Demo.SdlLibrary>(\"   \", info)"));
    assert!(imports.contains("internal static partial void Quit()"));
    assert!(imports.contains("unchecked((delegate* unmanaged<void>)global::_Lib0._Sym0)();"));
}

#[test]
fn test_marker_units_use_configured_namespace() {
    let output = generate(HEADER);

    let attributes = unit(&output, "Demo.Gen.NativeImportAttributes.g.cs");
    assert!(attributes.starts_with("// <auto-generated/>"));
    assert!(attributes.contains("namespace Demo.Gen;"));
    assert!(attributes.contains("interface INativeImportLibrary"));
    assert!(!attributes.contains("{{namespace}}"));

    let attribute = unit(&output, "Demo.Gen.FormattedConstantAttribute.g.cs");
    assert!(attribute.contains("class FormattedConstantAttribute"));
    assert_eq!(output.files.len(), 2);
}

#[test]
fn test_condition_only_library_checks_first() {
    let output = generate(&format!(
        r#"{HEADER}
[types."Demo.GlLibrary"]
[types."Demo.IsLinux"]
[types."Demo.IsWindows"]

[[members]]
container = "Demo.Gl"
name = "Flush"
[members.function]
library = "Demo.GlLibrary"
condition = "Demo.IsLinux"
name = "glFlush"

[[members]]
container = "Demo.Gl"
name = "Finish"
[members.function]
library = "Demo.GlLibrary"
condition = "Demo.IsWindows"
name = "glFinish"
"#
    ));

    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let imports = unit(&output, "Demo.Gen.NativeImports.g.cs");
    assert!(imports.contains(
        "var b0 = global::Demo.Gen.INativeImportCondition.Evaluate<global::Demo.IsLinux>();"
    ));
    assert!(imports.contains("if (!(b0 || b1))"));
    assert!(imports.contains("// Condition: Demo.IsWindows"));
    assert!(imports.contains("unchecked((delegate* unmanaged<void>)global::_Lib0._Sym1)();"));
}

#[test]
fn test_undeclared_library_is_reported() {
    let output = generate(&format!(
        r#"{HEADER}
[[members]]
container = "Demo.Sdl"
name = "Quit"
[members.function]
library = "Demo.Missing"
name = "SDL_Quit"
"#
    ));

    assert_eq!(diagnostic_ids(&output), vec!["NBIMP0022"]);
    assert!(output.has_errors());
    assert!(output.file("Demo.Gen.NativeImports.g.cs").is_none());
    let location = output.diagnostics[0].location.as_ref().unwrap();
    assert_eq!(location.file, "natbind.toml");
}

#[test]
fn test_library_nested_in_private_type_is_reported() {
    let output = generate(&format!(
        r#"{HEADER}
[types."Demo.Host"]
[types."Demo.Host+Hidden"]
accessibility = "private"
[types."Demo.Host+Hidden+Lib"]
accessibility = "public"

[[members]]
container = "Demo.Sdl"
name = "Quit"
[members.function]
library = "Demo.Host+Hidden+Lib"
name = "SDL_Quit"
"#
    ));

    assert_eq!(diagnostic_ids(&output), vec!["NBIMP0022"]);
    assert!(output.file("Demo.Gen.NativeImports.g.cs").is_none());
}

#[test]
fn test_condition_nested_in_private_type_is_reported() {
    let output = generate(&format!(
        r#"{HEADER}
[types."Demo.SdlLibrary"]
[types."Demo.Host"]
[types."Demo.Host+Hidden"]
accessibility = "private"
[types."Demo.Host+Hidden+IsLinux"]
accessibility = "public"

[[members]]
container = "Demo.Sdl"
name = "Quit"
[members.function]
library = "Demo.SdlLibrary"
condition = "Demo.Host+Hidden+IsLinux"
name = "SDL_Quit"
"#
    ));

    assert_eq!(diagnostic_ids(&output), vec!["NBIMP0023"]);
    assert!(output.file("Demo.Gen.NativeImports.g.cs").is_none());
}

#[test]
fn test_unsafe_disabled_aborts_imports_only() {
    let output = generate(&format!(
        r#"{HEADER}
[compilation]
allow_unsafe = false

[types."Demo.SdlLibrary"]

[[members]]
container = "Demo.Sdl"
name = "Quit"
[members.function]
library = "Demo.SdlLibrary"
name = "SDL_Quit"

[[members]]
container = "Demo.Consts"
name = "Name"
shape = "property"
returns = "string"
[members.constant]
format = "natbind"
"#
    ));

    assert_eq!(diagnostic_ids(&output), vec!["NBIMP0001"]);
    assert!(output.file("Demo.Gen.NativeImports.g.cs").is_none());
    assert!(
        unit(&output, "Demo.Gen.FormattedConstants.g.cs").contains("get => \"natbind\";")
    );
}

#[test]
fn test_byte_span_constant_method() {
    let output = generate(&format!(
        r#"{HEADER}
[[members]]
container = "Demo.Consts"
name = "Banner"
returns = "ReadOnlySpan<byte>"
params = [{{ name = "unused", type = "int" }}]
[members.constant]
format = "{{0:X4}}-{{1}}"
args = [255, true]
"#
    ));

    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let constants = unit(&output, "Demo.Gen.FormattedConstants.g.cs");
    assert!(constants.contains("#pragma warning disable IDE0060"));
    assert!(constants.contains(
        "internal static partial global::System.ReadOnlySpan<byte> Banner(int unused) => \"00FF-True\"u8;"
    ));
}

#[test]
fn test_generate_writes_units_once() {
    let temp = TempDir::new().unwrap();
    let manifest = Manifest::from_str(HEADER).unwrap();
    let decls = manifest.declarations().unwrap();
    let generator = Generator::new(&decls.compilation, &decls.members);

    let first = generator.generate(temp.path()).unwrap();
    assert_eq!(first.written.len(), 2);
    assert!(first.unchanged.is_empty());

    let second = generator.generate(temp.path()).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged.len(), 2);
    assert!(
        temp.path()
            .join("Natbind.SourceGeneration.NativeImportAttributes.g.cs")
            .exists()
    );
}

#[test]
fn test_generate_removes_imports_unit_once_unsafe_is_disabled() {
    let temp = TempDir::new().unwrap();
    let manifest_with = |allow_unsafe: bool| {
        format!(
            r#"{HEADER}
[compilation]
allow_unsafe = {allow_unsafe}

[types."Demo.SdlLibrary"]

[[members]]
container = "Demo.Sdl"
name = "Quit"
[members.function]
library = "Demo.SdlLibrary"
name = "SDL_Quit"
"#
        )
    };
    let imports = temp.path().join("Demo.Gen.NativeImports.g.cs");

    let manifest = Manifest::from_str(&manifest_with(true)).unwrap();
    let decls = manifest.declarations().unwrap();
    let options = GeneratorOptions {
        namespace: "Demo.Gen".to_string(),
        tool: manifest.generator.tool_info(),
    };
    let first = Generator::new(&decls.compilation, &decls.members)
        .with_options(options.clone())
        .generate(temp.path())
        .unwrap();
    assert!(first.written.contains(&imports));
    assert!(imports.exists());

    let manifest = Manifest::from_str(&manifest_with(false)).unwrap();
    let decls = manifest.declarations().unwrap();
    let second = Generator::new(&decls.compilation, &decls.members)
        .with_options(options)
        .generate(temp.path())
        .unwrap();
    assert_eq!(diagnostic_ids_of(&second.diagnostics), vec!["NBIMP0001"]);
    assert_eq!(second.removed, vec![imports.clone()]);
    assert!(!imports.exists());
    assert!(
        temp.path()
            .join("Demo.Gen.NativeImportAttributes.g.cs")
            .exists()
    );
}

use eyre::Result;
use natbind_codegen::pipeline::phases::{
    BuildConstantsPhase, BuildImportsPhase, ConstantsState, ExtractBindingsPhase,
    ExtractConstantsPhase, ImportsState, SpanGatePhase, UnsafeGatePhase,
};
use natbind_codegen::{
    Diagnostic, DiagnosticFamily, GenerateOutput, GenerationContext, LanguageCodegen, Pipeline,
};
use natbind_core::{GeneratedFile, SourceFile, ToolInfo};
use natbind_ir::{Compilation, MemberDecl};

use crate::constants::RenderConstantsPhase;
use crate::files::{FormattedConstantAttribute, NativeImportAttributes, Unit};
use crate::imports::RenderImportsPhase;

/// Namespace of the marker types when none is configured.
pub const DEFAULT_NAMESPACE: &str = "Natbind.SourceGeneration";

/// Settings shared by both generator passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Namespace of the marker types, also the file name prefix of every unit.
    pub namespace: String,
    /// Attribution written into every `GeneratedCode` attribute.
    pub tool: ToolInfo,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            tool: ToolInfo::default(),
        }
    }
}

/// Output of one generator pass.
#[derive(Debug, Default)]
pub struct PassOutput {
    /// The rendered unit; `None` when the pass aborted or accepted nothing.
    pub content: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// C# generator producing the native import and formatted constant units.
pub struct Generator<'a> {
    compilation: &'a Compilation,
    members: &'a [MemberDecl],
    options: GeneratorOptions,
}

impl LanguageCodegen for Generator<'_> {
    fn language(&self) -> &'static str {
        "csharp"
    }

    fn file_extension(&self) -> &'static str {
        "cs"
    }

    fn unit_names(&self) -> Vec<String> {
        Unit::ALL
            .iter()
            .map(|unit| unit.file_name(&self.options.namespace))
            .collect()
    }

    fn preview(&self) -> Result<GenerateOutput> {
        self.preview_files()
    }
}

impl<'a> Generator<'a> {
    pub fn new(compilation: &'a Compilation, members: &'a [MemberDecl]) -> Self {
        Self {
            compilation,
            members,
            options: GeneratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn imports_pipeline(&self) -> Pipeline<ImportsState> {
        Pipeline::new()
            .phase(ExtractBindingsPhase)
            .phase(UnsafeGatePhase)
            .phase(BuildImportsPhase)
            .phase(RenderImportsPhase {
                namespace: self.options.namespace.clone(),
                tool: self.options.tool.clone(),
            })
    }

    fn constants_pipeline(&self) -> Pipeline<ConstantsState> {
        Pipeline::new()
            .phase(ExtractConstantsPhase)
            .phase(SpanGatePhase)
            .phase(BuildConstantsPhase)
            .phase(RenderConstantsPhase {
                tool: self.options.tool.clone(),
            })
    }

    /// Run the native imports pass.
    pub fn imports(&self) -> Result<PassOutput> {
        let _span = tracing::info_span!("imports").entered();
        let mut ctx = GenerationContext::new(
            self.compilation,
            self.members,
            DiagnosticFamily::NativeImports,
        );
        let mut state = ImportsState::default();
        self.imports_pipeline().run(&mut ctx, &mut state)?;
        tracing::info!(
            errors = ctx.error_count(),
            aborted = ctx.is_aborted(),
            "imports pass finished"
        );
        Ok(PassOutput {
            content: state.output,
            diagnostics: ctx.diagnostics,
        })
    }

    /// Run the formatted constants pass.
    pub fn constants(&self) -> Result<PassOutput> {
        let _span = tracing::info_span!("constants").entered();
        let mut ctx = GenerationContext::new(
            self.compilation,
            self.members,
            DiagnosticFamily::FormattedConstants,
        );
        let mut state = ConstantsState::default();
        self.constants_pipeline().run(&mut ctx, &mut state)?;
        tracing::info!(
            errors = ctx.error_count(),
            aborted = ctx.is_aborted(),
            "constants pass finished"
        );
        Ok(PassOutput {
            content: state.output,
            diagnostics: ctx.diagnostics,
        })
    }

    /// Both marker units and whatever the two passes produce.
    fn preview_files(&self) -> Result<GenerateOutput> {
        let namespace = &self.options.namespace;
        let mut output = GenerateOutput::default();

        // Marker types are emitted unconditionally so user code can always
        // reference them.
        let attributes = NativeImportAttributes::new(namespace);
        output.files.push(SourceFile::new(
            Unit::NativeImportAttributes.file_name(namespace),
            attributes.render(),
        ));
        let attribute = FormattedConstantAttribute::new(namespace);
        output.files.push(SourceFile::new(
            Unit::FormattedConstantAttribute.file_name(namespace),
            attribute.render(),
        ));

        let imports = self.imports()?;
        if let Some(content) = imports.content {
            output
                .files
                .push(SourceFile::new(Unit::NativeImports.file_name(namespace), content));
        }
        output.diagnostics.extend(imports.diagnostics);

        let constants = self.constants()?;
        if let Some(content) = constants.content {
            output.files.push(SourceFile::new(
                Unit::FormattedConstants.file_name(namespace),
                content,
            ));
        }
        output.diagnostics.extend(constants.diagnostics);

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use natbind_codegen::testing::Fixtures;
    use natbind_core::Version;
    use natbind_ir::{FormatArg, TypeRef};

    use super::*;

    fn options() -> GeneratorOptions {
        GeneratorOptions {
            namespace: "Demo.Gen".into(),
            tool: ToolInfo::new("natbind", Version::new(0, 1, 0)),
        }
    }

    #[test]
    fn test_marker_units_always_present() {
        let compilation = Compilation::default();
        let generator = Generator::new(&compilation, &[]).with_options(options());

        let output = generator.preview().unwrap();

        let names: Vec<_> = output.files.iter().map(|f| f.hint_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Demo.Gen.NativeImportAttributes.g.cs",
                "Demo.Gen.FormattedConstantAttribute.g.cs",
            ]
        );
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_both_units_and_diagnostics_in_pass_order() {
        let mut fx = Fixtures::new();
        let lib = fx.library("Demo.SdlLibrary");
        let members = vec![
            fx.method("Demo.Consts", "Bad")
                .returns(TypeRef::string())
                .constant(None, Vec::new())
                .build(),
            fx.method("Demo.Consts", "Greeting")
                .returns(TypeRef::string())
                .constant(Some("Hello, {0}!"), vec![FormatArg::String("World".into())])
                .build(),
            fx.method("Demo.Sdl", "Init")
                .returns(TypeRef::primitive("uint"))
                .symbol(lib.clone(), Some("SDL_Init"), 0)
                .build(),
            fx.method("Demo.Sdl", "Broken")
                .returns(TypeRef::string())
                .symbol(lib, None, 1)
                .build(),
        ];
        let compilation = Compilation::default();
        let generator = Generator::new(&compilation, &members).with_options(options());

        let output = generator.preview().unwrap();

        assert!(output.file("Demo.Gen.NativeImports.g.cs").is_some());
        let constants = output.file("Demo.Gen.FormattedConstants.g.cs").unwrap();
        assert!(constants.content.contains("=> \"Hello, World!\";"));
        let ids: Vec<_> = output.diagnostics.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["NBIMP0032", "NBFMT0002"]);
        assert!(output.has_errors());
    }

    #[test]
    fn test_aborted_pass_produces_no_unit() {
        let mut fx = Fixtures::new();
        let lib = fx.library("Demo.SdlLibrary");
        let members = vec![
            fx.method("Demo.Sdl", "Init")
                .returns(TypeRef::primitive("uint"))
                .symbol(lib, None, 0)
                .build(),
        ];
        let compilation = Compilation {
            allow_unsafe: false,
            ..Compilation::default()
        };
        let generator = Generator::new(&compilation, &members);

        let imports = generator.imports().unwrap();

        assert!(imports.content.is_none());
        assert_eq!(imports.diagnostics.len(), 1);
        assert_eq!(imports.diagnostics[0].id, "NBIMP0001");
    }
}

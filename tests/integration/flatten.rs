use lygia_resolver::core::IncludeError;
use lygia_resolver::resolver::Resolver;
use lygia_resolver::test_utils::{ShaderProject, StaticFetcher, init_test_logging};

fn resolver(project: &ShaderProject, fetcher: StaticFetcher) -> Resolver<StaticFetcher> {
    init_test_logging(None);
    Resolver::with_fetcher(&project.config(), fetcher).unwrap()
}

#[tokio::test]
async fn test_nested_local_and_library_includes() {
    let project = ShaderProject::new().unwrap();
    project
        .write("shaders/common/light.glsl", "#include \"../util/math.glsl\"\nfloat light();")
        .unwrap();
    project.write("shaders/util/math.glsl", "float saturate(float x);").unwrap();
    let main = project
        .write(
            "shaders/main.frag",
            "precision mediump float;\n\
             #include \"lygia/color/space/rgb2hsv.glsl\"\n\
             #include \"common/light.glsl\"\n\
             void main() {}\n",
        )
        .unwrap();

    let fetcher = StaticFetcher::new()
        .with_document(
            "/color/space/rgb2hsv.glsl",
            "#include \"lygia/math/const.glsl\"\nvec3 rgb2hsv(vec3 c);",
        )
        .with_document("/math/const.glsl", "#define PI 3.1415926535");
    let resolver = resolver(&project, fetcher);

    let flattened = resolver.resolve_file(&main).await.unwrap();
    assert_eq!(
        flattened,
        "precision mediump float;\n\
         #define PI 3.1415926535\n\
         vec3 rgb2hsv(vec3 c);\n\
         float saturate(float x);\n\
         float light();\n\
         void main() {}\n"
    );
}

#[tokio::test]
async fn test_sibling_order_is_preserved_under_latency() {
    let project = ShaderProject::new().unwrap();
    let names: Vec<String> = (0..10).map(|i| format!("part{i}")).collect();
    let source: String =
        names.iter().map(|name| format!("#include \"lygia/{name}.glsl\"\n")).collect();
    let main = project.write("main.frag", &source).unwrap();

    let mut fetcher = StaticFetcher::new().with_latency(std::time::Duration::from_millis(5));
    for name in &names {
        fetcher = fetcher.with_document(&format!("/{name}.glsl"), name);
    }
    let resolver = resolver(&project, fetcher);

    let flattened = resolver.resolve_file(&main).await.unwrap();
    let expected = format!("{}\n", names.join("\n"));
    assert_eq!(flattened, expected);
}

#[tokio::test]
async fn test_malformed_directives_are_tolerated() {
    let project = ShaderProject::new().unwrap();
    project.write("a.glsl", "A").unwrap();
    project.write("b.glsl", "B").unwrap();
    let source = "   #include \"a.glsl\" ;;  \n#include \"b.glsl\nvoid f(); #include \"a.glsl\"";
    let main = project.write("main.frag", source).unwrap();

    let resolver = resolver(&project, StaticFetcher::new());
    let flattened = resolver.resolve_file(&main).await.unwrap();
    assert_eq!(flattened, "A\nB\nvoid f(); #include \"a.glsl\"");
}

#[tokio::test]
async fn test_crlf_input_is_split_per_line() {
    let project = ShaderProject::new().unwrap();
    project.write("a.glsl", "A").unwrap();
    let main = project.write("main.frag", "#include \"a.glsl\"\r\nvoid main() {}\r\n").unwrap();

    let resolver = resolver(&project, StaticFetcher::new());
    assert_eq!(resolver.resolve_file(&main).await.unwrap(), "A\nvoid main() {}\n");
}

#[tokio::test]
async fn test_missing_local_include_names_resolved_path() {
    let project = ShaderProject::new().unwrap();
    let main = project.write("shaders/main.frag", "#include \"../lib/missing.glsl\"").unwrap();

    let resolver = resolver(&project, StaticFetcher::new());
    let err = resolver.resolve_file(&main).await.unwrap_err();
    match err {
        IncludeError::LocalRead {
            path,
            ..
        } => assert_eq!(path, project.path("lib/missing.glsl")),
        other => panic!("expected LocalRead, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transitive_cycle_is_rejected() {
    let project = ShaderProject::new().unwrap();
    let a = project.write("a.glsl", "#include \"b.glsl\"").unwrap();
    project.write("b.glsl", "#include \"c.glsl\"").unwrap();
    project.write("c.glsl", "#include \"a.glsl\"").unwrap();

    let resolver = resolver(&project, StaticFetcher::new());
    let err = resolver.resolve_file(&a).await.unwrap_err();
    match err {
        IncludeError::CyclicInclude {
            chain,
        } => {
            let steps: Vec<&str> = chain.split(" -> ").collect();
            assert_eq!(steps.len(), 4);
            assert_eq!(steps.first(), steps.last());
        }
        other => panic!("expected CyclicInclude, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cycle_inside_library_is_rejected() {
    let project = ShaderProject::new().unwrap();
    let main = project.write("main.frag", "#include \"lygia/a.glsl\"").unwrap();
    let fetcher = StaticFetcher::new()
        .with_document("/a.glsl", "#include \"b.glsl\"")
        .with_document("/b.glsl", "#include \"lygia/a.glsl\"");

    let resolver = resolver(&project, fetcher);
    let err = resolver.resolve_file(&main).await.unwrap_err();
    match err {
        IncludeError::CyclicInclude {
            chain,
        } => assert_eq!(chain, "lygia/a.glsl -> lygia/b.glsl -> lygia/a.glsl"),
        other => panic!("expected CyclicInclude, got {other:?}"),
    }
}

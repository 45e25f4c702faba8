use std::collections::BTreeSet;
use std::sync::Arc;

use lygia_resolver::resolver::{DependencyGraph, Resolver};
use lygia_resolver::test_utils::{ShaderProject, StaticFetcher};

use crate::common::local_id;

fn set(items: &[String]) -> BTreeSet<String> {
    items.iter().cloned().collect()
}

/// Two entry shaders sharing a chain of includes, one of them from the
/// library:
///
/// ```text
/// scene.frag ─┐
///             ├─> common/lighting.glsl ─> common/brdf.glsl ─> lygia/math/const.glsl
/// post.frag ──┘
/// ```
async fn project_with_two_entries() -> (ShaderProject, Resolver<StaticFetcher>) {
    let project = ShaderProject::new().unwrap();
    project.write("common/brdf.glsl", "#include \"lygia/math/const.glsl\"\nbrdf").unwrap();
    project.write("common/lighting.glsl", "#include \"brdf.glsl\"\nlighting").unwrap();
    let scene = project.write("scene.frag", "#include \"common/lighting.glsl\"\nscene").unwrap();
    let post = project.write("post.frag", "#include \"common/lighting.glsl\"\npost").unwrap();

    let fetcher = StaticFetcher::new().with_document("/math/const.glsl", "PI");
    let resolver = Resolver::with_fetcher(&project.config(), fetcher).unwrap();
    resolver.resolve_file(&scene).await.unwrap();
    resolver.resolve_file(&post).await.unwrap();
    (project, resolver)
}

#[tokio::test]
async fn test_leaf_change_reaches_every_entry() {
    let (project, resolver) = project_with_two_entries().await;
    let entries = set(&[local_id(&project, "post.frag"), local_id(&project, "scene.frag")]);

    assert_eq!(resolver.on_dependency_changed(&local_id(&project, "common/brdf.glsl")), entries);
    assert_eq!(resolver.on_dependency_changed("lygia/math/const.glsl"), entries);
}

#[tokio::test]
async fn test_entry_change_affects_only_itself() {
    let (project, resolver) = project_with_two_entries().await;
    let scene = local_id(&project, "scene.frag");
    assert_eq!(resolver.on_dependency_changed(&scene), set(&[scene.clone()]));
}

#[tokio::test]
async fn test_unrelated_file_is_its_own_root() {
    let (project, resolver) = project_with_two_entries().await;
    let unrelated = local_id(&project, "unrelated.glsl");
    assert_eq!(resolver.on_dependency_changed(&unrelated), set(&[unrelated.clone()]));
}

#[tokio::test]
async fn test_removed_include_still_invalidates() {
    let (project, resolver) = project_with_two_entries().await;

    // post.frag stops including lighting; the old edge is kept.
    let post = project.write("post.frag", "post only").unwrap();
    resolver.resolve_file(&post).await.unwrap();

    let affected = resolver.on_dependency_changed(&local_id(&project, "common/lighting.glsl"));
    assert!(affected.contains(&local_id(&project, "post.frag")));
    assert!(affected.contains(&local_id(&project, "scene.frag")));
}

#[tokio::test]
async fn test_accumulated_parent_cycle_terminates() {
    let project = ShaderProject::new().unwrap();
    project.write("a.glsl", "#include \"b.glsl\"").unwrap();
    project.write("b.glsl", "b").unwrap();
    let root = project.write("root.frag", "#include \"a.glsl\"").unwrap();
    let resolver = Resolver::with_fetcher(&project.config(), StaticFetcher::new()).unwrap();
    resolver.resolve_file(&root).await.unwrap();

    // Later b includes a instead; a no longer includes b. Each pass is
    // acyclic, but the accumulated parent relation now has a <-> b.
    project.write("a.glsl", "a").unwrap();
    let b = project.write("b.glsl", "#include \"a.glsl\"").unwrap();
    resolver.resolve_file(&b).await.unwrap();

    let affected = resolver.on_dependency_changed(&local_id(&project, "a.glsl"));
    assert_eq!(affected, set(&[local_id(&project, "root.frag")]));
}

#[tokio::test]
async fn test_graph_survives_sessions_through_snapshot() {
    let (project, resolver) = project_with_two_entries().await;
    resolver.persist_graph().await.unwrap();

    let fresh = Resolver::with_fetcher(&project.config(), StaticFetcher::new()).unwrap();
    assert!(fresh.graph().is_empty());
    fresh.load_graph().await.unwrap();

    assert_eq!(
        fresh.on_dependency_changed("lygia/math/const.glsl"),
        set(&[local_id(&project, "post.frag"), local_id(&project, "scene.frag")])
    );
}

#[tokio::test]
async fn test_concurrent_passes_accumulate_edges() {
    let project = ShaderProject::new().unwrap();
    project.write("shared.glsl", "shared").unwrap();
    let entries: Vec<_> = (0..6)
        .map(|i| project.write(&format!("entry{i}.frag"), "#include \"shared.glsl\"").unwrap())
        .collect();
    let resolver = Resolver::with_fetcher(&project.config(), StaticFetcher::new()).unwrap();

    futures::future::try_join_all(entries.iter().map(|entry| resolver.resolve_file(entry)))
        .await
        .unwrap();

    let affected = resolver.on_dependency_changed(&local_id(&project, "shared.glsl"));
    assert_eq!(affected.len(), 6);
}

#[tokio::test]
async fn test_resolvers_sharing_a_graph_see_each_others_edges() {
    let project = ShaderProject::new().unwrap();
    project.write("common.glsl", "common").unwrap();
    let scene = project.write("scene.frag", "#include \"common.glsl\"").unwrap();
    let post = project.write("post.frag", "#include \"common.glsl\"").unwrap();

    let graph = Arc::new(DependencyGraph::new());
    let build = Resolver::with_fetcher(&project.config(), StaticFetcher::new())
        .unwrap()
        .with_graph(Arc::clone(&graph));
    let watch = Resolver::with_fetcher(&project.config(), StaticFetcher::new())
        .unwrap()
        .with_graph(Arc::clone(&graph));

    build.resolve_file(&scene).await.unwrap();
    watch.resolve_file(&post).await.unwrap();

    let expected = set(&[local_id(&project, "post.frag"), local_id(&project, "scene.frag")]);
    assert!(Arc::ptr_eq(build.graph(), watch.graph()));
    assert_eq!(build.on_dependency_changed(&local_id(&project, "common.glsl")), expected);
    assert_eq!(watch.on_dependency_changed(&local_id(&project, "common.glsl")), expected);
}

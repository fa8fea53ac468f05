use cgmath::{Matrix4, Point3, Transform, Vector3};
use reel_ngin::EngineError;
use reel_ngin::data_structures::scene_graph::SceneGraph;

fn three_level_graph() -> SceneGraph {
    let mut graph = SceneGraph::new("root");
    let body = graph.add_child(graph.root(), "body").expect("attach body");
    let arm = graph.add_child(body, "arm").expect("attach arm");
    graph.add_child(arm, "hand").expect("attach hand");
    graph.add_child(body, "leg").expect("attach leg");
    graph
}

#[test]
fn should_refuse_to_attach_a_node_twice() {
    let mut graph = SceneGraph::new("root");
    let a = graph.add_child(graph.root(), "a").expect("attach a");
    let b = graph.add_child(graph.root(), "b").expect("attach b");

    let err = graph.attach(b, a).unwrap_err();
    assert_eq!(err, EngineError::NodeAlreadyParented("a".to_string()));
}

#[test]
fn should_find_nested_nodes_depth_first() {
    let graph = three_level_graph();
    let hand = graph.find(graph.root(), "hand").expect("hand exists");
    assert_eq!(graph.node(hand).name(), "hand");
    assert!(graph.find(graph.root(), "tail").is_none());
}

#[test]
fn should_match_the_search_start_itself() {
    let graph = three_level_graph();
    let body = graph.find(graph.root(), "body").expect("body exists");
    assert_eq!(graph.find(body, "body"), Some(body));
}

#[test]
fn should_stop_traversal_when_the_visitor_declines() {
    let graph = three_level_graph();
    let mut visited = Vec::new();
    let completed = graph.traverse(graph.root(), &mut |node| {
        visited.push(node.name().to_string());
        node.name() != "arm"
    });

    assert!(!completed);
    // pre-order: root, body, arm; the stop is global, leg is never reached
    assert_eq!(visited, vec!["root", "body", "arm"]);
}

#[test]
fn should_visit_the_whole_tree_when_never_declined() {
    let graph = three_level_graph();
    let mut count = 0;
    let completed = graph.traverse(graph.root(), &mut |_| {
        count += 1;
        true
    });
    assert!(completed);
    assert_eq!(count, 5);
}

#[test]
fn should_compose_scale_and_translation_down_the_tree() {
    let mut graph = SceneGraph::new("root");
    let parent = graph.add_child(graph.root(), "parent").expect("attach");
    let child = graph.add_child(parent, "child").expect("attach");
    graph.set_scale(parent, Vector3::new(2.0, 2.0, 2.0));
    graph.set_translate(parent, Vector3::new(1.0, 0.0, 0.0));
    graph.set_translate(child, Vector3::new(0.0, 3.0, 0.0));
    graph.mark_ready(parent);
    graph.mark_ready(child);

    let mut child_model = None;
    graph
        .render(graph.root(), &mut |_, node, model| {
            if node.name() == "child" {
                child_model = Some(model);
            }
        })
        .expect("render");

    let model: Matrix4<f32> = child_model.expect("child visited");
    let origin = model.transform_point(Point3::new(0.0, 0.0, 0.0));
    // parent scales by 2 then translates by (1,0,0) in its scaled space,
    // child adds (0,3,0) inside that space
    assert!((origin.x - 2.0).abs() < 1e-5);
    assert!((origin.y - 6.0).abs() < 1e-5);
    assert!((origin.z - 0.0).abs() < 1e-5);
}

#[test]
fn should_fail_rendering_an_unready_node() {
    let mut graph = SceneGraph::new("root");
    let ready = graph.add_child(graph.root(), "ready").expect("attach");
    graph.add_child(graph.root(), "pending").expect("attach");
    graph.mark_ready(ready);

    let err = graph.render(graph.root(), &mut |_, _, _| {}).unwrap_err();
    assert_eq!(err, EngineError::NodeNotReady("pending".to_string()));
}

#[test]
fn should_exempt_the_root_from_the_readiness_check() {
    let graph = SceneGraph::new("root");
    let mut visited = 0;
    graph
        .render(graph.root(), &mut |_, _, _| visited += 1)
        .expect("render");
    assert_eq!(visited, 1);
}

// tests/swizzle_integration.rs
//! End-to-end interception scenarios

use serde_json::{json, Value};
use std::sync::Arc;
use swizzle_engine::runtime::{ImpId, Method};
use swizzle_engine::{
    ClassBuilder, ClassRegistry, InstrumentationPlan, InterceptionError, Selector, SwizzleRegistry,
    SwizzleSpec,
};

fn sel(name: &str) -> Selector {
    Selector::new(name)
}

fn send(classes: &ClassRegistry, class: &str, selector: &str) -> Value {
    let obj = classes.instantiate(class).unwrap();
    classes.send(&obj, &sel(selector), &[]).unwrap()
}

/// View ─┬─ Button
///       └─ Label
fn ui_hierarchy() -> (Arc<ClassRegistry>, SwizzleRegistry) {
    let classes = Arc::new(ClassRegistry::new());
    classes
        .define_class(
            ClassBuilder::new("View")
                .method("accessibilityLabel", "*", |_| Ok(json!("view")))
                .method("isVisible", "B", |_| Ok(json!(true))),
        )
        .unwrap();
    classes
        .define_class(
            ClassBuilder::new("Button")
                .superclass("View")
                .method("tap", "v", |inv| {
                    inv.receiver().bump_ivar("taps");
                    Ok(Value::Null)
                })
                .method("recordedTap", "v", |inv| {
                    inv.receiver().bump_ivar("observed");
                    // Reach the pre-swizzle implementation
                    inv.send(&Selector::new("recordedTap"), &[])
                })
                .method("stubLabel", "*", |_| Ok(json!("stubbed"))),
        )
        .unwrap();
    classes
        .define_class(ClassBuilder::new("Label").superclass("View"))
        .unwrap();

    let swizzles = SwizzleRegistry::new(Arc::clone(&classes));
    (classes, swizzles)
}

#[test]
fn greeter_scenario() {
    let classes = Arc::new(ClassRegistry::new());
    classes
        .define_class(
            ClassBuilder::new("Greeter")
                .method("sayHello", "*", |_| Ok(json!("hello")))
                .method("sayHelloMock", "*", |_| Ok(json!("mock"))),
        )
        .unwrap();
    let swizzles = SwizzleRegistry::new(Arc::clone(&classes));

    let err = swizzles
        .swizzle_method(&sel("sayHello"), &sel("noSuchSelector"), "Greeter")
        .unwrap_err();
    assert!(matches!(err, InterceptionError::SelectorNotFound { .. }));
    assert_eq!(send(&classes, "Greeter", "sayHello"), json!("hello"));

    swizzles
        .swizzle_method(&sel("sayHello"), &sel("sayHelloMock"), "Greeter")
        .unwrap();
    assert_eq!(send(&classes, "Greeter", "sayHello"), json!("mock"));
    assert_eq!(send(&classes, "Greeter", "sayHelloMock"), json!("hello"));
}

#[test]
fn existing_instances_see_the_swap() {
    let (classes, swizzles) = ui_hierarchy();
    let button = classes.instantiate("Button").unwrap();

    swizzles
        .swizzle_method(&sel("tap"), &sel("recordedTap"), "Button")
        .unwrap();

    classes.send(&button, &sel("tap"), &[]).unwrap();
    classes.send(&button, &sel("tap"), &[]).unwrap();

    assert_eq!(button.get_ivar("observed"), Some(json!(2)));
    assert_eq!(button.get_ivar("taps"), Some(json!(2)));
}

#[test]
fn inherited_selector_stays_local_to_class() {
    let (classes, swizzles) = ui_hierarchy();

    let record = swizzles
        .swizzle_method(&sel("accessibilityLabel"), &sel("stubLabel"), "Button")
        .unwrap();
    assert_eq!(record.synthesized, vec![sel("accessibilityLabel")]);

    assert_eq!(send(&classes, "Button", "accessibilityLabel"), json!("stubbed"));
    assert_eq!(send(&classes, "Button", "stubLabel"), json!("view"));

    // Superclass and sibling keep the original behaviour
    assert_eq!(send(&classes, "View", "accessibilityLabel"), json!("view"));
    assert_eq!(send(&classes, "Label", "accessibilityLabel"), json!("view"));
    assert!(!classes
        .class("View")
        .unwrap()
        .has_own_method(&sel("stubLabel")));
}

#[test]
fn forwarder_follows_later_superclass_changes() {
    let (classes, swizzles) = ui_hierarchy();
    swizzles
        .swizzle_method(&sel("accessibilityLabel"), &sel("stubLabel"), "Button")
        .unwrap();

    let view = classes.class("View").unwrap();
    view.replace_method(
        sel("accessibilityLabel"),
        Method::new("*".parse().unwrap(), |_| Ok(json!("view-v2"))),
    );

    assert_eq!(send(&classes, "Button", "stubLabel"), json!("view-v2"));

    // The superclass may also change the signature behind the forwarder
    view.replace_method(
        sel("accessibilityLabel"),
        Method::new("*i".parse().unwrap(), |inv| {
            Ok(json!(format!("view-{}", inv.arg(0)?)))
        }),
    );

    let button = classes.instantiate("Button").unwrap();
    assert_eq!(
        classes.send(&button, &sel("stubLabel"), &[json!(7)]).unwrap(),
        json!("view-7")
    );
    let err = classes.send(&button, &sel("stubLabel"), &[]).unwrap_err();
    assert!(matches!(err, InterceptionError::ArgumentMismatch { .. }));
}

#[test]
fn both_selectors_inherited() {
    let (classes, swizzles) = ui_hierarchy();
    classes
        .define_class(
            ClassBuilder::new("IconButton")
                .superclass("Button")
                .method("icon", "*", |_| Ok(json!("star"))),
        )
        .unwrap();

    let record = swizzles
        .swizzle_method(&sel("accessibilityLabel"), &sel("stubLabel"), "IconButton")
        .unwrap();
    assert_eq!(record.synthesized.len(), 2);

    assert_eq!(send(&classes, "IconButton", "accessibilityLabel"), json!("stubbed"));
    assert_eq!(send(&classes, "IconButton", "stubLabel"), json!("view"));
    assert_eq!(send(&classes, "Button", "accessibilityLabel"), json!("view"));
    assert_eq!(send(&classes, "Button", "stubLabel"), json!("stubbed"));
}

#[test]
fn signatures_move_with_code() {
    let (classes, swizzles) = ui_hierarchy();
    swizzles
        .swizzle_method(&sel("isVisible"), &sel("accessibilityLabel"), "View")
        .unwrap();

    let view = classes.class("View").unwrap();
    let visible = view.own_method(&sel("isVisible")).unwrap();
    assert_eq!(visible.signature().to_string(), "*");
    assert_eq!(send(&classes, "View", "isVisible"), json!("view"));
    assert_eq!(send(&classes, "View", "accessibilityLabel"), json!(true));
}

#[test]
fn failed_swizzle_leaves_table_untouched() {
    let (classes, swizzles) = ui_hierarchy();
    let button = classes.class("Button").unwrap();
    let selectors = [sel("tap"), sel("accessibilityLabel")];
    let before = button.implementation_ids(&selectors);
    let own_before = button.selectors();

    let err = swizzles
        .swizzle_method(&sel("accessibilityLabel"), &sel("doubleTap"), "Button")
        .unwrap_err();
    assert_eq!(
        err,
        InterceptionError::SelectorNotFound {
            class: "Button".to_string(),
            selector: "doubleTap".to_string(),
        }
    );

    assert_eq!(button.implementation_ids(&selectors), before);
    assert_eq!(button.selectors(), own_before);
    assert_eq!(swizzles.swizzle_count(), 0);
}

#[test]
fn swizzling_twice_restores_pairing() {
    let (classes, swizzles) = ui_hierarchy();
    let button = classes.class("Button").unwrap();
    let selectors = [sel("tap"), sel("recordedTap")];
    let before = button.implementation_ids(&selectors);

    swizzles
        .swizzle_method(&sel("tap"), &sel("recordedTap"), "Button")
        .unwrap();
    assert_ne!(button.implementation_ids(&selectors), before);

    swizzles
        .swizzle_method(&sel("tap"), &sel("recordedTap"), "Button")
        .unwrap();
    assert_eq!(button.implementation_ids(&selectors), before);
}

#[test]
fn swizzle_with_itself_is_harmless() {
    let (classes, swizzles) = ui_hierarchy();
    let record = swizzles
        .swizzle_method(&sel("isVisible"), &sel("isVisible"), "Button")
        .unwrap();
    assert_eq!(record.synthesized, vec![sel("isVisible")]);
    assert_eq!(send(&classes, "Button", "isVisible"), json!(true));
}

#[test]
fn plan_from_config_applies_in_order() {
    let (classes, swizzles) = ui_hierarchy();
    let plan = InstrumentationPlan::new()
        .swizzle(SwizzleSpec::new("Button", "tap", "recordedTap"))
        .swizzle(SwizzleSpec::new("Button", "accessibilityLabel", "stubLabel"));

    let report = plan.apply(&swizzles).unwrap();
    assert_eq!(report.applied.len(), 2);
    assert_eq!(send(&classes, "Button", "accessibilityLabel"), json!("stubbed"));

    let history = swizzles.history();
    assert_eq!(history[0].original, sel("tap"));
    assert_eq!(history[1].original, sel("accessibilityLabel"));
}

#[test]
fn swap_is_never_half_applied() {
    let (classes, swizzles) = ui_hierarchy();
    let button = classes.class("Button").unwrap();
    let selectors = [sel("tap"), sel("recordedTap")];
    let initial: Vec<ImpId> = button
        .implementation_ids(&selectors)
        .into_iter()
        .map(|id| id.unwrap())
        .collect();

    crossbeam::scope(|s| {
        for _ in 0..4 {
            let button = Arc::clone(&button);
            let selectors = selectors.clone();
            let initial = initial.clone();
            s.spawn(move |_| {
                for _ in 0..2_000 {
                    let ids: Vec<ImpId> = button
                        .implementation_ids(&selectors)
                        .into_iter()
                        .map(|id| id.unwrap())
                        .collect();
                    assert_ne!(ids[0], ids[1]);
                    let swapped = vec![initial[1], initial[0]];
                    assert!(ids == initial || ids == swapped);
                }
            });
        }

        s.spawn(|_| {
            for _ in 0..1_000 {
                swizzles
                    .swizzle_method(&sel("tap"), &sel("recordedTap"), "Button")
                    .unwrap();
            }
        });
    })
    .unwrap();

    // Even number of swaps
    assert_eq!(
        button
            .implementation_ids(&selectors)
            .into_iter()
            .map(|id| id.unwrap())
            .collect::<Vec<_>>(),
        initial
    );
}

#[test]
fn concurrent_dispatch_during_swizzle() {
    let (classes, swizzles) = ui_hierarchy();

    crossbeam::scope(|s| {
        for _ in 0..4 {
            let classes = Arc::clone(&classes);
            s.spawn(move |_| {
                let button = classes.instantiate("Button").unwrap();
                for _ in 0..1_000 {
                    let label = classes
                        .send(&button, &sel("accessibilityLabel"), &[])
                        .unwrap();
                    assert!(label == json!("view") || label == json!("stubbed"));
                }
            });
        }

        s.spawn(|_| {
            for _ in 0..500 {
                swizzles
                    .swizzle_method(&sel("accessibilityLabel"), &sel("stubLabel"), "Button")
                    .unwrap();
            }
        });
    })
    .unwrap();
}

use crate::containers::RunList;

use super::{
    BuiltinKind, Builtins, ClassId, ClassRegistry, FuncType, Mismatch, ObjectType, Overload, Type,
    VerifyError,
};

fn setup() -> (ClassRegistry, Builtins) {
    let mut registry = ClassRegistry::new();
    let builtins = Builtins::synthesize(&mut registry);
    (registry, builtins)
}

fn class(registry: &mut ClassRegistry, name: &str, fields: &[(&str, Type)]) -> ClassId {
    let id = registry.declare(name).unwrap();
    for (field, ty) in fields {
        registry.get_mut(id).fields.insert(*field, ty.clone());
    }
    id
}

#[test]
fn test_builtin_operator_table() {
    let (registry, builtins) = setup();
    let int = registry.get(builtins.get(BuiltinKind::Int));
    let string = registry.get(builtins.get(BuiltinKind::String));
    let boolean = registry.get(builtins.get(BuiltinKind::Bool));
    let double = registry.get(builtins.get(BuiltinKind::Double));

    assert_eq!(int.field("+").unwrap().to_string(), "(int) -> int");
    assert_eq!(int.field("<").unwrap().to_string(), "(int) -> bool");
    assert!(int.field("%=").is_some());
    assert!(double.field("%").is_none());
    assert!(string.field("+=").is_some());
    assert!(string.field("-").is_none());
    assert!(boolean.field("+").is_none());
    assert_eq!(boolean.field("==").unwrap().to_string(), "(bool) -> bool");
}

#[test]
fn test_builtins_cast_to_every_builtin() {
    let (registry, builtins) = setup();
    for kind in BuiltinKind::ALL {
        let casts = registry.get(builtins.get(kind)).field("=>").unwrap();
        assert_eq!(
            casts.to_string(),
            "() -> int & () -> bool & () -> double & () -> string"
        );
    }
}

#[test]
fn test_builtin_lookup_by_name() {
    let (registry, builtins) = setup();
    assert_eq!(BuiltinKind::from_name("double"), Some(BuiltinKind::Double));
    assert_eq!(BuiltinKind::from_name("float"), None);
    assert_eq!(registry.lookup("string"), Some(builtins.get(BuiltinKind::String)));
    assert!(builtins.is(&builtins.object(BuiltinKind::Int), BuiltinKind::Int));
    assert!(!builtins.is(&builtins.object(BuiltinKind::Int), BuiltinKind::Double));
}

#[test]
fn test_hierarchy_cache_agrees_with_structure_in_any_order() {
    let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];

    for order in orders {
        let (mut registry, builtins) = setup();
        let int = builtins.object(BuiltinKind::Int);
        let string = builtins.object(BuiltinKind::String);

        let ids = [
            class(&mut registry, "Empty", &[]),
            class(&mut registry, "Point", &[("x", int.clone()), ("y", int.clone())]),
            class(&mut registry, "Line", &[("x", int.clone())]),
            class(&mut registry, "Named", &[("x", int.clone()), ("name", string.clone())]),
        ];
        for index in order {
            registry.add_comparison(ids[index]);
        }

        for &a in ids.iter() {
            for &b in ids.iter() {
                assert_eq!(
                    registry.is_a(a, b),
                    registry.class_satisfies(a, b).is_ok(),
                    "{} is-a {} with order {:?}",
                    registry.get(a).name,
                    registry.get(b).name,
                    order
                );
            }
        }
        assert!(registry.is_a(ids[1], ids[2]));
        assert!(!registry.is_a(ids[2], ids[1]));
        assert!(registry.is_a(ids[3], ids[0]));
    }
}

#[test]
#[should_panic(expected = "internal compiler error")]
fn test_registering_twice_is_internal_error() {
    let (mut registry, builtins) = setup();
    registry.add_comparison(builtins.get(BuiltinKind::Int));
}

#[test]
fn test_declare_rejects_taken_name() {
    let (mut registry, builtins) = setup();
    assert_eq!(registry.declare("int"), Err(builtins.get(BuiltinKind::Int)));
    assert!(registry.declare("Foo").is_ok());
}

#[test]
fn test_display_every_variant() {
    let (registry, builtins) = setup();
    let int = builtins.object(BuiltinKind::Int);
    let string = builtins.object(BuiltinKind::String);

    let mut elements = RunList::new();
    elements.push_run(int.clone(), 2);
    elements.push(string.clone());

    let object = Type::Object(ObjectType {
        class_name: "Box".to_string(),
        class: None,
        generics: vec![int.clone()],
    });
    let func = Type::Func(FuncType {
        overloads: vec![
            Overload::new(vec![int.clone(), int.clone()], int.clone()),
            Overload::new(vec![], Type::None),
        ],
    });

    assert_eq!(Type::Class(registry.handle(builtins.get(BuiltinKind::Int))).to_string(), "class int");
    assert_eq!(object.to_string(), "Box<int>");
    assert_eq!(func.to_string(), "(int, int) -> int & () -> none");
    assert_eq!(Type::Array(Box::new(string.clone())).to_string(), "string[]");
    assert_eq!(Type::Tuple(elements.clone()).to_string(), "(int, int, string)");
    assert_eq!(Type::Spread(elements).to_string(), "...(int, int, string)");
    assert_eq!(Type::Maybe(Box::new(int.clone())).to_string(), "int?");
    assert_eq!(Type::None.to_string(), "none");

    let single: RunList<Type> = [int].into_iter().collect();
    assert_eq!(Type::Tuple(single).to_string(), "(int,)");
}

#[test]
fn test_copy_renders_identically() {
    let (registry, builtins) = setup();
    let int = builtins.object(BuiltinKind::Int);
    let samples = vec![
        Type::Class(registry.handle(builtins.get(BuiltinKind::String))),
        int.clone(),
        Type::func(vec![int.clone()], Type::Maybe(Box::new(int.clone()))),
        Type::Array(Box::new(Type::Array(Box::new(int.clone())))),
        Type::Tuple([int.clone(), Type::None].into_iter().collect()),
        Type::Spread([int.clone(), int.clone()].into_iter().collect()),
        Type::None,
    ];

    for ty in samples {
        let copy = ty.clone();
        assert_eq!(copy.to_string(), ty.to_string());
        assert_eq!(copy, ty);
    }
}

#[test]
fn test_class_copy_keeps_identity() {
    let (mut registry, _) = setup();
    let id = class(&mut registry, "Foo", &[]);
    let handle = registry.handle(id);
    let copy = handle.clone();

    assert_eq!(copy.id, id);
    registry.get_mut(id).fields.insert("late", Type::None);
    assert!(registry.get(copy.id).field("late").is_some());
}

#[test]
fn test_compare_objects_uses_cache() {
    let (mut registry, builtins) = setup();
    let int = builtins.object(BuiltinKind::Int);
    let wide = class(&mut registry, "Wide", &[("a", int.clone()), ("b", int.clone())]);
    let narrow = class(&mut registry, "Narrow", &[("a", int.clone())]);
    registry.add_comparison(wide);
    registry.add_comparison(narrow);

    assert_eq!(registry.compare(&registry.object(wide), &registry.object(narrow)), Ok(()));
    assert_eq!(
        registry.compare(&registry.object(narrow), &registry.object(wide)),
        Err(Mismatch::Incompatible)
    );
    assert_eq!(
        registry.compare(&int, &builtins.object(BuiltinKind::String)),
        Err(Mismatch::Incompatible)
    );
}

#[test]
fn test_compare_classes_structurally() {
    let (mut registry, builtins) = setup();
    let int = builtins.object(BuiltinKind::Int);
    let a = class(&mut registry, "A", &[("x", int.clone()), ("y", int.clone())]);
    let b = class(&mut registry, "B", &[("x", int.clone())]);
    let c = class(&mut registry, "C", &[("x", builtins.object(BuiltinKind::Double))]);

    let class_type = |id| Type::Class(registry.handle(id));
    assert_eq!(registry.compare(&class_type(a), &class_type(b)), Ok(()));
    assert_eq!(registry.compare(&class_type(b), &class_type(a)), Err(Mismatch::Incompatible));
    assert_eq!(registry.compare(&class_type(c), &class_type(b)), Err(Mismatch::Incompatible));
    assert_eq!(registry.compare(&class_type(c), &class_type(c)), Ok(()));
}

#[test]
fn test_compare_functions() {
    let (mut registry, builtins) = setup();
    let int = builtins.object(BuiltinKind::Int);
    let string = builtins.object(BuiltinKind::String);
    let animal = class(&mut registry, "Animal", &[("legs", int.clone())]);
    let dog = class(
        &mut registry,
        "Dog",
        &[("legs", int.clone()), ("name", string.clone())],
    );
    registry.add_comparison(animal);
    registry.add_comparison(dog);
    let animal = registry.object(animal);
    let dog = registry.object(dog);

    // contravariant arguments
    let takes_animal = Type::func(vec![animal.clone()], Type::None);
    let takes_dog = Type::func(vec![dog.clone()], Type::None);
    assert_eq!(registry.compare(&takes_animal, &takes_dog), Ok(()));
    assert!(registry.compare(&takes_dog, &takes_animal).is_err());

    // covariant return
    let gives_dog = Type::func(vec![], dog.clone());
    let gives_animal = Type::func(vec![], animal.clone());
    assert_eq!(registry.compare(&gives_dog, &gives_animal), Ok(()));
    assert!(registry.compare(&gives_animal, &gives_dog).is_err());

    // overload containment
    let both = Type::Func(FuncType {
        overloads: vec![
            Overload::new(vec![int.clone()], int.clone()),
            Overload::new(vec![string.clone()], int.clone()),
        ],
    });
    let one = Type::func(vec![string.clone()], int.clone());
    assert_eq!(registry.compare(&both, &one), Ok(()));
    assert!(registry.compare(&one, &both).is_err());

    // arity
    let binary = Type::func(vec![int.clone(), int.clone()], int.clone());
    assert!(registry.compare(&binary, &Type::func(vec![int.clone()], int)).is_err());
}

#[test]
fn test_compare_containers_are_invariant() {
    let (mut registry, builtins) = setup();
    let int = builtins.object(BuiltinKind::Int);
    let wide = class(&mut registry, "Wide", &[("a", int.clone()), ("b", int.clone())]);
    let narrow = class(&mut registry, "Narrow", &[("a", int.clone())]);
    registry.add_comparison(wide);
    registry.add_comparison(narrow);

    let array = |ty: Type| Type::Array(Box::new(ty));
    let maybe = |ty: Type| Type::Maybe(Box::new(ty));

    assert_eq!(registry.compare(&array(int.clone()), &array(int.clone())), Ok(()));
    assert!(registry
        .compare(&array(registry.object(wide)), &array(registry.object(narrow)))
        .is_err());
    assert_eq!(registry.compare(&maybe(int.clone()), &maybe(int.clone())), Ok(()));
    assert!(registry.compare(&int, &maybe(int.clone())).is_err());
}

#[test]
fn test_compare_none_and_tuples() {
    let (registry, builtins) = setup();
    let int = builtins.object(BuiltinKind::Int);
    let tuple = Type::Tuple([int.clone()].into_iter().collect());

    assert_eq!(registry.compare(&Type::None, &Type::None), Ok(()));
    assert!(registry.compare(&Type::None, &int).is_err());
    assert!(registry.compare(&int, &Type::None).is_err());
    assert_eq!(
        registry.compare(&tuple, &tuple),
        Err(Mismatch::Unsupported("Tuple comparisons"))
    );
    assert_eq!(registry.compare(&tuple, &int), Err(Mismatch::Incompatible));
}

#[test]
#[should_panic(expected = "internal compiler error")]
fn test_compare_unverified_object_is_internal_error() {
    let (registry, builtins) = setup();
    let unresolved = Type::Object(ObjectType::unresolved("int"));
    let _ = registry.compare(&unresolved, &builtins.object(BuiltinKind::Int));
}

#[test]
fn test_intersect() {
    let (mut registry, builtins) = setup();
    let int = builtins.object(BuiltinKind::Int);
    let string = builtins.object(BuiltinKind::String);
    let shape = class(&mut registry, "Shape", &[("area", int.clone())]);
    let square = class(&mut registry, "Square", &[("area", int.clone()), ("side", int.clone())]);
    let circle = class(
        &mut registry,
        "Circle",
        &[("area", int.clone()), ("radius", int.clone())],
    );
    for id in [shape, square, circle] {
        registry.add_comparison(id);
    }

    assert_eq!(registry.intersect(&int, &int), Ok(int.clone()));
    assert_eq!(
        registry.intersect(&registry.object(square), &registry.object(shape)),
        Ok(registry.object(shape))
    );
    assert_eq!(
        registry.intersect(&registry.object(square), &registry.object(circle)),
        Ok(registry.object(shape))
    );
    assert_eq!(
        registry.intersect(&Type::None, &string),
        Err(Mismatch::Incompatible)
    );
}

#[test]
fn test_verify_resolves_annotations() {
    let (registry, builtins) = setup();
    let mut annotation = Type::func(
        vec![Type::Object(ObjectType::unresolved("int"))],
        Type::Array(Box::new(Type::Object(ObjectType::unresolved("string")))),
    );
    annotation.verify(&registry).unwrap();
    assert_eq!(
        annotation,
        Type::func(
            vec![builtins.object(BuiltinKind::Int)],
            Type::Array(Box::new(builtins.object(BuiltinKind::String)))
        )
    );

    let mut unknown = Type::Maybe(Box::new(Type::Object(ObjectType::unresolved("Nope"))));
    assert_eq!(
        unknown.verify(&registry),
        Err(VerifyError::UnknownClass("Nope".to_string()))
    );

    let mut generic = Type::Object(ObjectType {
        class_name: "List".to_string(),
        class: None,
        generics: vec![builtins.object(BuiltinKind::Int)],
    });
    assert_eq!(
        generic.verify(&registry),
        Err(VerifyError::Generics("List".to_string()))
    );
}

#[test]
fn test_func_signature_lookup() {
    let (_, builtins) = setup();
    let int = builtins.object(BuiltinKind::Int);
    let string = builtins.object(BuiltinKind::String);
    let mut func = FuncType::single(vec![int.clone()], int.clone());
    func.overloads.push(Overload::new(vec![string.clone()], string.clone()));

    assert_eq!(func.signature(&[string.clone()]).map(|o| &o.return_type), Some(&string));
    assert_eq!(func.signature(&[int.clone()]).map(|o| &o.return_type), Some(&int));
    assert!(func.signature(&[int.clone(), int]).is_none());
    assert!(func.signature(&[]).is_none());
}

#[test]
fn test_spread_of_tuple() {
    let (_, builtins) = setup();
    let elements: RunList<Type> = [builtins.object(BuiltinKind::Int)].into_iter().collect();
    assert_eq!(
        Type::Tuple(elements.clone()).to_spread(),
        Some(Type::Spread(elements))
    );
    assert_eq!(builtins.object(BuiltinKind::Int).to_spread(), None);
}

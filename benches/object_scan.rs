use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::ops::ControlFlow;

use ue_reader::synthetic::{SyntheticImage, SyntheticTarget};
use ue_reader::{ObjectTable, StructWalker, UeOffsets};

fn build_image(offsets: UeOffsets, classes: usize) -> SyntheticTarget {
    let mut image = SyntheticImage::new(offsets);
    let package = image.package("/Script/Bench");
    let mut parent = 0;
    for i in 0..classes {
        let class = image.class(&format!("Class{i}"), parent, package);
        let a = image.property(class, "Health", "FloatProperty", 0x28, 4);
        let b = image.property(class, "Tags", "ArrayProperty", 0x30, 0x10);
        let inner = image.property(b, "Tags", "NameProperty", 0, 8);
        image.set_payload(b, 0, inner);
        image.link_properties(class, &[a, b]);
        image.object(&format!("Instance{i}"), class, package);
        // Keep inheritance chains shallow
        parent = if i % 16 == 15 { 0 } else { class };
    }
    image.finish()
}

fn bench_registry_scan(c: &mut Criterion) {
    let image = build_image(UeOffsets::ue4_25(), 500);
    let table = ObjectTable::new(image.target());

    c.bench_function("registry_scan", |b| {
        b.iter(|| {
            let mut visited = 0usize;
            table
                .for_each(|object| {
                    visited += object.name().len();
                    ControlFlow::Continue(())
                })
                .ok();
            black_box(visited)
        });
    });
}

fn bench_collect(c: &mut Criterion) {
    let mut offsets = UeOffsets::ue4_22();
    offsets.object_array.elements_per_chunk = Some(256);
    let image = build_image(offsets, 200);
    let walker = StructWalker::new(ObjectTable::new(image.target()));

    c.bench_function("collect_reflection", |b| {
        b.iter(|| black_box(walker.collect().ok()));
    });
}

criterion_group!(benches, bench_registry_scan, bench_collect);
criterion_main!(benches);

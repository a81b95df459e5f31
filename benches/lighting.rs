use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vectorfx::filters::lighting::Normal;
use vectorfx::length::NormalizeParams;
use vectorfx::rect::{IRect, Rect};
use vectorfx::surface_utils::shared_surface::{SharedImageSurface, SurfaceType};
use vectorfx::transform::Transform;
use vectorfx::{FilterDocument, FilterRenderer, Session};

const SURFACE_SIDE: i32 = 256;
const BOUNDS: IRect = IRect {
    x0: 0,
    y0: 0,
    x1: SURFACE_SIDE,
    y1: SURFACE_SIDE,
};

fn bump_surface() -> cairo::ImageSurface {
    let surface =
        cairo::ImageSurface::create(cairo::Format::ARgb32, SURFACE_SIDE, SURFACE_SIDE).unwrap();

    {
        let cr = cairo::Context::new(&surface).unwrap();
        let side = f64::from(SURFACE_SIDE);
        let gradient = cairo::RadialGradient::new(
            side / 2.0,
            side / 2.0,
            0.0,
            side / 2.0,
            side / 2.0,
            side / 2.0,
        );
        gradient.add_color_stop_rgba(0.0, 1.0, 1.0, 1.0, 1.0);
        gradient.add_color_stop_rgba(1.0, 1.0, 1.0, 1.0, 0.0);
        cr.set_source(&gradient).unwrap();
        cr.paint().unwrap();
    }

    surface
}

fn bench_normal(c: &mut Criterion) {
    let surface = SharedImageSurface::wrap(bump_surface(), SurfaceType::SRgb).unwrap();

    c.bench_function("normal at every pixel", |b| {
        b.iter(|| {
            for y in BOUNDS.y_range() {
                for x in BOUNDS.x_range() {
                    black_box(Normal::at(&surface, BOUNDS, x as u32, y as u32));
                }
            }
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let session = Session::new_for_test_suite();
    let document = FilterDocument::load_from_str(
        r#"<filter id="light" filterUnits="userSpaceOnUse" x="0" y="0" width="256" height="256">
             <feDiffuseLighting surfaceScale="4" diffuseConstant="1.2">
               <fePointLight x="64" y="64" z="80"/>
             </feDiffuseLighting>
           </filter>"#,
        &session,
    )
    .unwrap();

    let spec = document
        .lookup("light")
        .unwrap()
        .to_filter_spec(&NormalizeParams::new(256.0, 256.0));
    let renderer = FilterRenderer::new(&session);
    let source = bump_surface();
    let bbox = Rect::from_size(256.0, 256.0);

    c.bench_function("render feDiffuseLighting", |b| {
        b.iter(|| {
            renderer
                .render(black_box(&spec), &source, Transform::identity(), Some(bbox))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_normal, bench_render);
criterion_main!(benches);

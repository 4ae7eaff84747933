#![allow(clippy::unwrap_used)]

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use approx::assert_relative_eq;
use figura::config::TracerConfig;
use figura::conic::{
    ConeDetail, ConicKind, CoordinateSystem, CurveMask, EllipsoidDetail, HConic, HEllipse, PlaneSection, RotatedConic,
    TorusDetail,
};
use figura::geometry::Surface;
use figura::math::{Matrix4, Point2, Point3, Vector3, Vector4};
use figura::shape::{Rectangle, Shape, ShapeKind, SimpleShape};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn single_ellipse(section: &PlaneSection) -> &HEllipse {
    match section.conics() {
        Some([HConic::Ellipse(e)]) => e,
        other => panic!("expected one ellipse, got {other:?}"),
    }
}

#[test]
fn overlapping_rectangles_intersect_to_a_rectangle() {
    init_tracing();
    let a = Shape::rectangle(0.0, 0.0, 10.0, 10.0);
    let b = Shape::rectangle(5.0, 5.0, 15.0, 15.0);
    let common = a.intersect(&b).unwrap();
    match common.kind() {
        ShapeKind::Simple(SimpleShape::Rectangle(r)) => {
            assert_eq!(*r, Rectangle::new(5.0, 5.0, 10.0, 10.0));
        }
        other => panic!("expected a rectangle, got {other:?}"),
    }
    assert_relative_eq!(common.area(), 25.0);
}

#[test]
fn disk_minus_left_half_plane_box() {
    init_tracing();
    let disk = Shape::circle(Point2::new(0.0, 0.0), 5.0).unwrap();
    let left = Shape::rectangle(-10.0, -10.0, 0.0, 10.0);
    let right_half = disk.differentiate(&left).unwrap();
    assert_relative_eq!(right_half.area(), 25.0 * PI / 2.0, epsilon = 1e-6);
    assert!(right_half.is_point_in(&Point2::new(2.0, 0.5)));
    assert!(!right_half.is_point_in(&Point2::new(-2.0, 0.5)));
    assert!(right_half.is_point_on(&Point2::new(0.0, 3.0)));
}

#[test]
fn universe_minus_unit_circle() {
    init_tracing();
    let circle = Shape::circle(Point2::new(0.0, 0.0), 1.0).unwrap();
    let outside = Shape::universe().differentiate(&circle).unwrap();
    assert!(!outside.is_empty());
    assert!(outside.area().is_infinite());
    assert!(!outside.is_point_in(&Point2::new(0.0, 0.0)));
    assert!(outside.is_point_in(&Point2::new(5.0, 5.0)));
    // Complementing again gives the circle back.
    let back = outside.complement().unwrap();
    assert_relative_eq!(back.area(), PI, epsilon = 1e-9);
}

#[test]
fn placed_cylinder_cut_at_half_height() {
    init_tracing();
    let frame = Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0)) * Matrix4::new_scaling(2.0);
    let cylinder = RotatedConic::from_cone(&ConeDetail {
        frame,
        radius0: 1.0,
        radius1: 1.0,
        theta0: 0.0,
        sweep: TAU,
    })
    .unwrap();
    assert_eq!(cylinder.surface_degree(), 2);

    // Local z = 0.5 sits at world z = 4.
    let section = cylinder.intersect_plane(&Vector4::new(0.0, 0.0, 1.0, -4.0));
    let circle = single_ellipse(&section);
    for theta in [0.0, 0.9, 2.0, 5.5] {
        let p = circle.point_at(theta).unwrap();
        assert_relative_eq!(p.z, 4.0, epsilon = 1e-9);
        assert_relative_eq!((p.x - 1.0).hypot(p.y - 2.0), 2.0, epsilon = 1e-9);
    }
}

#[test]
fn sphere_silhouette_from_eye_on_axis() {
    init_tracing();
    let sphere = RotatedConic::from_ellipsoid(&EllipsoidDetail {
        frame: Matrix4::identity(),
        theta0: 0.0,
        theta_sweep: TAU,
        phi0: -FRAC_PI_2,
        phi_sweep: PI,
    })
    .unwrap();
    let section = sphere.silhouette(&Vector4::new(0.0, 0.0, 5.0, 1.0)).unwrap();
    let rim = single_ellipse(&section);
    let total: f64 = rim.sectors.iter().map(|s| s.length()).sum();
    assert_relative_eq!(total, TAU, epsilon = 1e-9);
    let p = rim.point_at(0.3).unwrap();
    assert_relative_eq!(p.z, 0.2, epsilon = 1e-12);
    assert_relative_eq!(p.x.hypot(p.y), 0.96_f64.sqrt(), epsilon = 1e-12);

    // The lower hemisphere never reaches the rim.
    let lower = RotatedConic::from_ellipsoid(&EllipsoidDetail {
        frame: Matrix4::identity(),
        theta0: 0.0,
        theta_sweep: TAU,
        phi0: -FRAC_PI_2,
        phi_sweep: FRAC_PI_2,
    })
    .unwrap();
    let clipped = lower.silhouette(&Vector4::new(0.0, 0.0, 5.0, 1.0)).unwrap();
    for conic in clipped.conics().unwrap() {
        match conic {
            HConic::Null => {}
            HConic::Ellipse(e) => assert!(e.sectors.is_empty()),
            other => panic!("unexpected rim piece {other:?}"),
        }
    }
}

fn placed_torus() -> RotatedConic {
    RotatedConic::from_torus(&TorusDetail {
        frame: Matrix4::new_translation(&Vector3::new(0.0, 0.0, 10.0)),
        minor_ratio: 0.25,
        theta0: 0.0,
        theta_sweep: TAU,
        phi0: 0.0,
        phi_sweep: TAU,
    })
    .unwrap()
}

#[test]
fn lines_against_placed_torus() {
    init_tracing();
    let torus = placed_torus();
    let through_hole = torus
        .intersect_line(&Point3::new(0.0, 0.0, 7.0), &Point3::new(0.0, 0.0, 13.0))
        .unwrap();
    assert!(through_hole.is_empty());
    let through_tube = torus
        .intersect_line(&Point3::new(0.0, 1.0, 7.0), &Point3::new(0.0, 1.0, 13.0))
        .unwrap();
    assert_eq!(through_tube.len(), 2);
    assert_relative_eq!(through_tube[0].point.z, 9.75, epsilon = 1e-8);
    assert_relative_eq!(through_tube[1].point.z, 10.25, epsilon = 1e-8);
}

#[test]
fn traced_torus_section_lies_on_both_surfaces() {
    init_tracing();
    let torus = placed_torus();
    // Tilted plane through the torus center: no closed form.
    let plane = Vector4::new(0.3, 0.0, 1.0, -10.0);
    assert!(!torus.intersect_plane(&plane).is_exact());

    let mut points = Vec::new();
    torus
        .trace_plane_section(&plane, &TracerConfig::default(), |batch, mask, _| {
            assert!(mask.contains(CurveMask::SMOOTH));
            points.extend_from_slice(batch);
            Ok(())
        })
        .unwrap();
    assert!(!points.is_empty());
    for p in &points {
        assert!((0.3 * p.x + p.z - 10.0).abs() < 1e-4);
        let rho = p.x.hypot(p.y) - 1.0;
        let z = p.z - 10.0;
        assert_relative_eq!(rho.hypot(z), 0.25, epsilon = 1e-9);
    }
}

/// Normal is a unit vector orthogonal to both parameter tangents.
fn assert_normal_is_orthogonal(s: &RotatedConic, u: f64, v: f64) {
    let h = 1e-5;
    let du = s.evaluate(u + h, v).unwrap() - s.evaluate(u - h, v).unwrap();
    let dv = s.evaluate(u, v + h).unwrap() - s.evaluate(u, v - h).unwrap();
    let n = s.normal(u, v).unwrap();
    assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
    assert!(n.dot(&du.normalize()).abs() < 1e-6);
    assert!(n.dot(&dv.normalize()).abs() < 1e-6);
}

fn assert_world_round_trip(classified: &RotatedConic, p: &Point3) {
    let q = classified
        .transform_point(p, CoordinateSystem::World, CoordinateSystem::Parameter)
        .unwrap();
    assert!(q.z.abs() < 1e-9, "offset {} off the surface", q.z);
    let back = classified
        .transform_point(&q, CoordinateSystem::Parameter, CoordinateSystem::World)
        .unwrap();
    assert_relative_eq!(back, *p, epsilon = 1e-9);
    assert!(classified.is_point_on_patch(p, CoordinateSystem::World).unwrap());
}

#[test]
fn swept_generators_have_normals_and_classify() {
    init_tracing();
    let frustum = RotatedConic::rotated_line(
        &Point3::new(2.0, 0.0, 1.0),
        &Point3::new(3.0, 0.0, 2.0),
        &Point3::new(0.0, 0.0, 1.0),
        &Vector3::z(),
        PI,
    )
    .unwrap();
    let ball = RotatedConic::rotated_ellipse(
        &Point3::new(1.0, 1.0, 1.0),
        &Vector3::new(2.0, 0.0, 0.0),
        &Vector3::new(0.0, 0.0, 2.0),
        -FRAC_PI_2,
        PI,
        &Point3::new(1.0, 1.0, 0.0),
        &Vector3::z(),
        TAU,
    )
    .unwrap();

    for (generator, expected) in [(&frustum, ConicKind::Cone), (&ball, ConicKind::Sphere)] {
        let classified = generator.copy_classified().unwrap();
        assert_eq!(*classified.kind(), expected);
        for (u, v) in [(0.3, 0.25), (1.1, 0.5), (2.5, 0.75)] {
            let (u, v) = match expected {
                // Latitudes of the swept arc run over (-π/2, π/2).
                ConicKind::Sphere => (u, v * PI - FRAC_PI_2),
                _ => (u, v),
            };
            assert_normal_is_orthogonal(generator, u, v);
            let p = generator.evaluate(u, v).unwrap();
            assert_world_round_trip(&classified, &p);
        }
    }
}

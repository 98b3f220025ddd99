//! Three triangles tiling a 800x600 window, described in screen coordinates (y pointing down).
//!
//! Run with `cargo run --example three_triangles`.
use anyhow::Result;
use trapmap::{Area, BoundingBox, BuildOptions, Location, Point, PointLocator, TrapMap, Winding};

fn main() -> Result<()> {
    let (width, height) = (800., 600.);

    // Winding is detected, so the vertices may be listed in either direction
    let areas = [
        Area::new(0, [[0., 0.], [400., 0.], [0., 600.]]),
        Area::new(1, [[0., 600.], [400., 0.], [800., 600.]]),
        Area::new(2, [[400., 0.], [800., 0.], [800., 600.]]),
    ];
    let bbox = BoundingBox::new(0., width, 0., height);
    let options = BuildOptions::default().with_winding(Winding::Detect).shuffled(42);
    let trap_map = TrapMap::with_options(&areas, bbox, options)?;
    trap_map.check()?;
    println!("{}", trap_map.stats());

    for (x, y) in [
        (100., 100.),
        (700., 100.),
        (400., 300.),
        (100., 500.),
        (400., 0.),
        (900., 300.),
    ] {
        let description = match trap_map.locate(Point::new(x, y)) {
            Location::Site(site) => format!("inside area {site}"),
            Location::Background => "outside of every area".to_string(),
            Location::OnBoundary => "on a boundary".to_string(),
        };
        println!("({x}, {y}) is {description}");
    }

    let grid: Vec<_> = (0..8)
        .flat_map(|i| (0..6).map(move |j| [i as f64 * 100. + 50., j as f64 * 100. + 50.]))
        .collect();
    let sites = trap_map.par_locate_many(&grid);
    for j in 0..6 {
        let row: String = (0..8)
            .map(|i| match sites[i * 6 + j] {
                Some(site) => char::from(b'0' + site as u8),
                None => '.',
            })
            .collect();
        println!("{row}");
    }

    Ok(())
}

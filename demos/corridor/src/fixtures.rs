//! Embedded routes and geofences along the Mobile Bay corridor.

use anyhow::Result;

use gt_core::GeoPoint;
use gt_geofence::Geofence;

// Three delivery runs.  `causeway` and `downtown` share the `bay` collection;
// `airport` has its own.
pub const ROUTES_CSV: &str = "\
route_id,name,collection_id,seq,lat,lon\n\
causeway,Causeway run,bay,0,30.6954,-88.0399\n\
causeway,Causeway run,bay,1,30.6890,-88.0180\n\
causeway,Causeway run,bay,2,30.6812,-87.9946\n\
causeway,Causeway run,bay,3,30.6730,-87.9703\n\
causeway,Causeway run,bay,4,30.6655,-87.9475\n\
downtown,Downtown loop,bay,0,30.6944,-88.0431\n\
downtown,Downtown loop,bay,1,30.6921,-88.0475\n\
downtown,Downtown loop,bay,2,30.6890,-88.0440\n\
downtown,Downtown loop,bay,3,30.6912,-88.0392\n\
airport,Airport shuttle,air,0,30.6912,-88.0430\n\
airport,Airport shuttle,air,1,30.6870,-88.0900\n\
airport,Airport shuttle,air,2,30.6840,-88.1350\n\
airport,Airport shuttle,air,3,30.6790,-88.1800\n\
airport,Airport shuttle,air,4,30.6913,-88.2428\n\
";

pub const GEOFENCES_CSV: &str = "\
collection_id,geofence_id,lat,lon,radius_m\n\
bay,port-terminal,30.6920,-88.0440,450\n\
bay,battleship-park,30.6818,-87.9950,900\n\
air,mob-terminal,30.6913,-88.2428,1500\n\
air,i65-interchange,30.6850,-88.1300,1200\n\
";

/// The eastern shore landing, added to `bay` as a polygon.
pub fn eastern_shore() -> Result<Geofence> {
    Ok(Geofence::polygon("eastern-shore", vec![
        GeoPoint::new(30.6600, -87.9550),
        GeoPoint::new(30.6600, -87.9350),
        GeoPoint::new(30.6720, -87.9350),
        GeoPoint::new(30.6720, -87.9550),
    ])?)
}

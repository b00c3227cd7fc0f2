pub mod appointment;
pub mod barbershop;
pub mod holiday;
pub mod operating_hours;
pub mod service;
pub mod unit;
pub mod user;

pub use appointment::{
    Appointment, AppointmentDetails, AppointmentRequest, AppointmentStatus, AppointmentView,
    Customer, DATE_FORMAT,
};
pub use barbershop::{Barbershop, BarbershopDetails, BarbershopRequest, UpdateBarbershopRequest};
pub use holiday::{Holiday, HolidayRequest, UpdateHolidayRequest, HOLIDAY_DATE_FORMAT};
pub use operating_hours::{DayHours, OperatingHours};
pub use service::{
    CreateGlobalServiceRequest, CreateLocalServiceRequest, GlobalService, LocalService,
    ServiceRef, ServiceSummary, ServiceType, UpdateGlobalServiceRequest, UpdateLocalServiceRequest,
};
pub use unit::{Address, Unit, UnitDetails, UnitRequest};
pub use user::{CreateUserRequest, Role, UpdateUserRequest, User, UserSummary};

//! Headless form model: a declarative structure is built into a tree of
//! stateful controls that a rendering `Surface` mirrors.

pub mod button;
pub mod container;
pub mod control;
pub mod controls;
pub mod error;
pub mod events;
pub mod form;
pub mod kind;
pub mod localization;
pub mod registry;
pub mod scheduler;
pub mod structure;
pub mod surface;
pub mod timer;
pub mod widget;

pub use button::Button;
pub use container::Container;
pub use control::{AuxButton, Control, ControlBase, FormScope, HasButton, HasInput};
pub use controls::*;
pub use error::{FormError, FormResult};
pub use events::{EventHandler, EventKind, FormEvent, Handlers, TickHandler};
pub use form::{Form, FormBuilder, FormContext, FormHandle, FormState};
pub use kind::ControlKind;
pub use localization::{Language, Localization};
pub use registry::{BuildContext, KindRegistry};
pub use scheduler::{Scheduler, TaskId};
pub use structure::{
    AuxButtonDef, ButtonDef, ColumnDef, ControlDef, FieldLabel, FormDef, ListButtonDef,
    NameValueItem, RowDef,
};
pub use surface::{ElementId, NullSurface, Part, RecordingSurface, Surface, SurfaceOp, Transition};
pub use timer::{Repeat, Timer, TimerHandle};
pub use widget::{ExtensionControl, Widget};

//! Districts by state, used to pick neighbouring markets.

const STATES: &[(&str, &[&str])] = &[
  ("Andhra Pradesh", &["Anantapur", "Chittoor", "East Godavari", "Guntur", "Krishna", "Kurnool", "Nellore", "Prakasam", "Srikakulam", "Visakhapatnam", "West Godavari"]),
  ("Gujarat", &["Ahmedabad", "Amreli", "Anand", "Banaskantha", "Bhavnagar", "Junagadh", "Kutch", "Mehsana", "Rajkot", "Surat", "Vadodara"]),
  ("Haryana", &["Ambala", "Bhiwani", "Hisar", "Jind", "Karnal", "Kurukshetra", "Panipat", "Rohtak", "Sirsa", "Sonipat"]),
  ("Karnataka", &["Belagavi", "Bellary", "Bengaluru Rural", "Davanagere", "Dharwad", "Hassan", "Kalaburagi", "Mandya", "Mysuru", "Raichur", "Shivamogga", "Tumakuru"]),
  ("Madhya Pradesh", &["Bhopal", "Dewas", "Gwalior", "Hoshangabad", "Indore", "Jabalpur", "Mandsaur", "Sagar", "Ujjain", "Vidisha"]),
  ("Maharashtra", &["Ahmednagar", "Akola", "Amravati", "Aurangabad", "Jalgaon", "Kolhapur", "Latur", "Nagpur", "Nashik", "Pune", "Sangli", "Satara", "Solapur"]),
  ("Punjab", &["Amritsar", "Bathinda", "Faridkot", "Ferozepur", "Jalandhar", "Ludhiana", "Moga", "Patiala", "Sangrur"]),
  ("Rajasthan", &["Ajmer", "Alwar", "Bikaner", "Ganganagar", "Jaipur", "Jodhpur", "Kota", "Nagaur", "Udaipur"]),
  ("Tamil Nadu", &["Coimbatore", "Cuddalore", "Erode", "Madurai", "Salem", "Thanjavur", "Tiruchirappalli", "Tirunelveli", "Vellore", "Villupuram"]),
  ("Telangana", &["Adilabad", "Karimnagar", "Khammam", "Mahabubnagar", "Medak", "Nalgonda", "Nizamabad", "Rangareddy", "Warangal"]),
  ("Uttar Pradesh", &["Agra", "Aligarh", "Bareilly", "Gorakhpur", "Kanpur Nagar", "Lucknow", "Meerut", "Moradabad", "Muzaffarnagar", "Varanasi"]),
  ("West Bengal", &["Bankura", "Bardhaman", "Birbhum", "Hooghly", "Jalpaiguri", "Malda", "Murshidabad", "Nadia", "Purulia"]),
];

/// Districts of `state` (case-insensitive); empty for an unknown state.
pub fn districts_in(state: &str) -> &'static [&'static str] {
  let state = state.trim();
  STATES
    .iter()
    .find(|(name, _)| name.eq_ignore_ascii_case(state))
    .map(|(_, districts)| *districts)
    .unwrap_or(&[])
}
